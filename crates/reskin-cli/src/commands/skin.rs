//! Skin command - re-skin and rebuild the site of a released version

use clap::Args;
use console::style;
use reskin_core::TextEncoding;
use reskin_scm::ScmManager;
use reskin_site::XmlDescriptorCodec;
use reskin_workflow::{
    MavenInvoker, PomProjectBuilder, SkinOptions, SkinWorkflow, WorkflowContext,
};
use std::path::PathBuf;

use crate::error::{CliError, Result};
use crate::util;

#[derive(Args, Debug)]
pub struct SkinArgs {
    /// The current project's pom.xml
    #[arg(short, long, default_value = "pom.xml")]
    pub project: PathBuf,

    /// Delete the working copy and check the released sources out again
    #[arg(long)]
    pub force_checkout: bool,

    /// Only apply the skin and identity; leave breadcrumbs, footer, head and links alone
    #[arg(long = "no-merge-body")]
    pub no_merge_body: bool,

    /// Run site-deploy instead of site
    #[arg(long)]
    pub site_deploy: bool,

    /// Version or range of the release; defaults to every version below the current one
    #[arg(long)]
    pub released_version: Option<String>,

    /// Where the released sources are checked out
    #[arg(long)]
    pub working_directory: Option<PathBuf>,

    /// Comma separated globs of released sources to check out
    #[arg(long)]
    pub includes: Option<String>,

    /// Comma separated globs of released sources to leave out
    #[arg(long)]
    pub excludes: Option<String>,

    /// Encoding of site descriptors without an XML declaration
    #[arg(long, default_value = "UTF-8")]
    pub input_encoding: String,

    /// Encoding of written descriptors when the source declared none
    #[arg(long, default_value = "UTF-8")]
    pub output_encoding: String,

    /// Repository settings file
    #[arg(long, env = "RESKIN_SETTINGS")]
    pub settings: Option<PathBuf>,

    /// Never contact remote repositories
    #[arg(long)]
    pub offline: bool,

    /// Maven executable; MAVEN_HOME, M2_HOME and PATH are searched otherwise
    #[arg(long, env = "RESKIN_MAVEN")]
    pub maven: Option<PathBuf>,

    /// System property for the site build (key=value)
    #[arg(short = 'D', long = "define", value_parser = util::parse_property)]
    pub properties: Vec<(String, String)>,

    /// Profiles to activate in the site build
    #[arg(short = 'P', long = "activate-profiles", value_delimiter = ',')]
    pub profiles: Vec<String>,
}

impl SkinArgs {
    fn options(&self, debug: bool) -> SkinOptions {
        SkinOptions {
            force_checkout: self.force_checkout,
            merge_body: !self.no_merge_body,
            site_deploy: self.site_deploy,
            released_version: self.released_version.clone(),
            working_directory: self.working_directory.clone(),
            scm_includes: self.includes.clone(),
            scm_excludes: self.excludes.clone(),
            properties: self.properties.clone(),
            profiles: self.profiles.clone(),
            debug,
        }
    }

    fn codec(&self) -> Result<XmlDescriptorCodec> {
        let encoding = |label: &str, flag: &str| {
            TextEncoding::from_label(label).map_err(|e| {
                CliError::usage_with_help(
                    format!("--{}: {}", flag, e),
                    "Use a WHATWG encoding label such as UTF-8, ISO-8859-1 or windows-1252",
                )
            })
        };
        Ok(XmlDescriptorCodec::new(
            encoding(&self.input_encoding, "input-encoding")?,
            encoding(&self.output_encoding, "output-encoding")?,
        ))
    }
}

pub fn run(args: &SkinArgs, debug: bool) -> Result<()> {
    util::check_range(args.released_version.as_deref())?;
    let codec = args.codec()?;
    let current = util::load_project(&args.project)?;

    println!(
        "{} Re-skinning the release before {} {}",
        style("→").blue(),
        style(current.coordinates().key()).cyan(),
        current.version
    );

    let repository = util::load_repository(args.settings.as_deref(), args.offline)?;
    let projects = PomProjectBuilder::new(&repository);
    let scm = ScmManager::default();
    let invoker = MavenInvoker::locate(args.maven.as_deref())?;

    let context = WorkflowContext {
        projects: &projects,
        repository: &repository,
        scm: &scm,
        codec: &codec,
        invoker: &invoker,
    };
    let report = SkinWorkflow::new(context, args.options(debug)).run(&current)?;

    println!(
        "  {} Released version {}",
        style("✓").green(),
        style(&report.released.version).bold()
    );
    println!(
        "  {} {} ({} file(s))",
        style("✓").green(),
        report.sync.operation,
        report.sync.files
    );
    for descriptor in &report.descriptors {
        println!("  {} Merged {}", style("✓").green(), descriptor.display());
    }
    println!(
        "\n{} mvn {} completed for {}",
        style("✓").green().bold(),
        report.goal,
        report.released
    );
    Ok(())
}
