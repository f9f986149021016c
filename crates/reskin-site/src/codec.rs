//! Reading and writing site descriptors

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use reskin_core::{TextEncoding, XmlDocument};

use crate::descriptor::SiteDescriptor;
use crate::error::{Result, SiteError};

/// Site-descriptor codec collaborator
pub trait DescriptorCodec {
    fn read(&self, input: &mut dyn Read) -> Result<SiteDescriptor>;

    fn write(&self, output: &mut dyn Write, descriptor: &SiteDescriptor) -> Result<()>;

    fn read_file(&self, path: &Path) -> Result<SiteDescriptor> {
        let file = File::open(path).map_err(|e| SiteError::read(path, e))?;
        let mut reader = BufReader::new(file);
        self.read(&mut reader).map_err(|e| match e {
            SiteError::Io(io) => SiteError::read(path, io),
            SiteError::Core(core) => SiteError::read(path, core),
            other => other,
        })
    }

    /// Write to `path`, creating its parent directory when missing
    fn write_file(&self, path: &Path, descriptor: &SiteDescriptor) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| SiteError::write(path, e))?;
        }
        let file = File::create(path).map_err(|e| SiteError::write(path, e))?;
        let mut writer = BufWriter::new(file);
        self.write(&mut writer, descriptor)
            .and_then(|_| writer.flush().map_err(SiteError::from))
            .map_err(|e| match e {
                SiteError::Io(io) => SiteError::write(path, io),
                SiteError::Core(core) => SiteError::write(path, core),
                other => other,
            })
    }
}

/// XML codec. The declared encoding of a document wins over
/// `input_encoding`; output is written in the descriptor's model encoding
/// when it has one, `output_encoding` otherwise.
#[derive(Debug, Clone, Copy, Default)]
pub struct XmlDescriptorCodec {
    pub input_encoding: TextEncoding,
    pub output_encoding: TextEncoding,
}

impl XmlDescriptorCodec {
    pub fn new(input_encoding: TextEncoding, output_encoding: TextEncoding) -> Self {
        Self {
            input_encoding,
            output_encoding,
        }
    }

    fn encoding_for(&self, descriptor: &SiteDescriptor) -> Result<TextEncoding> {
        match &descriptor.model_encoding {
            Some(label) => Ok(TextEncoding::from_label(label)?),
            None => Ok(self.output_encoding),
        }
    }
}

impl DescriptorCodec for XmlDescriptorCodec {
    fn read(&self, input: &mut dyn Read) -> Result<SiteDescriptor> {
        let mut bytes = Vec::new();
        input.read_to_end(&mut bytes)?;
        let doc = XmlDocument::from_bytes(&bytes, self.input_encoding)?;

        let mut descriptor = SiteDescriptor::from_node(&doc.root)?;
        descriptor.model_encoding = Some(match doc.encoding {
            Some(declared) => TextEncoding::from_label(&declared)?.label().to_string(),
            None => self.input_encoding.label().to_string(),
        });
        Ok(descriptor)
    }

    fn write(&self, output: &mut dyn Write, descriptor: &SiteDescriptor) -> Result<()> {
        let encoding = self.encoding_for(descriptor)?;
        let bytes = XmlDocument::new(descriptor.to_node()).to_bytes(encoding)?;
        output.write_all(&bytes)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::Skin;

    #[test]
    fn test_declared_encoding_becomes_model_encoding() {
        let codec = XmlDescriptorCodec::default();
        let xml = b"<?xml version=\"1.0\" encoding=\"ISO-8859-1\"?><project name=\"Caf\xE9\"/>";
        let descriptor = codec.read(&mut &xml[..]).unwrap();
        assert_eq!(descriptor.model_encoding.as_deref(), Some("ISO-8859-1"));
        assert_eq!(descriptor.name.as_deref(), Some("Caf\u{e9}"));
    }

    #[test]
    fn test_input_encoding_used_without_declaration() {
        let codec = XmlDescriptorCodec::new(TextEncoding::Latin1, TextEncoding::Utf8);
        let descriptor = codec.read(&mut &b"<project name=\"Caf\xE9\"/>"[..]).unwrap();
        assert_eq!(descriptor.model_encoding.as_deref(), Some("ISO-8859-1"));
        assert_eq!(descriptor.name.as_deref(), Some("Caf\u{e9}"));
    }

    #[test]
    fn test_write_uses_output_encoding_without_model_encoding() {
        let codec = XmlDescriptorCodec::new(TextEncoding::Utf8, TextEncoding::Latin1);
        let descriptor = SiteDescriptor {
            name: Some("Caf\u{e9}".to_string()),
            ..SiteDescriptor::default()
        };
        let mut out = Vec::new();
        codec.write(&mut out, &descriptor).unwrap();
        assert!(out.starts_with(b"<?xml version=\"1.0\" encoding=\"ISO-8859-1\"?>"));
        assert!(out.windows(4).any(|w| w == b"Caf\xE9"));
    }

    #[test]
    fn test_html_entities_survive_rewrite() {
        let xml = b"<?xml version=\"1.0\" encoding=\"ISO-8859-1\"?>
<project name=\"Demo\">
  <body>
    <footer>&copy; 2011&nbsp;Example</footer>
  </body>
</project>";
        let codec = XmlDescriptorCodec::default();
        let descriptor = codec.read(&mut &xml[..]).unwrap();
        let footer = descriptor.body.as_ref().and_then(|b| b.footer.as_ref());
        assert_eq!(
            footer.and_then(|f| f.value()),
            Some("\u{a9} 2011\u{a0}Example")
        );

        let mut out = Vec::new();
        codec.write(&mut out, &descriptor).unwrap();
        assert!(out.windows(6).any(|w| w == b"\xA9 2011"));
        let reread = codec.read(&mut &out[..]).unwrap();
        assert_eq!(reread.body, descriptor.body);
    }

    #[test]
    fn test_reads_windows_1252_descriptor() {
        let xml = b"<?xml version=\"1.0\" encoding=\"windows-1252\"?><project name=\"\x80 Demo\"/>";
        let descriptor = XmlDescriptorCodec::default().read(&mut &xml[..]).unwrap();
        assert_eq!(descriptor.model_encoding.as_deref(), Some("windows-1252"));
        assert_eq!(descriptor.name.as_deref(), Some("\u{20ac} Demo"));
    }

    #[test]
    fn test_file_round_trip_creates_parent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("src/site/site.xml");
        let codec = XmlDescriptorCodec::default();
        let descriptor = SiteDescriptor {
            skin: Some(Skin {
                group_id: Some("org.apache.maven.skins".to_string()),
                artifact_id: Some("maven-fluido-skin".to_string()),
                version: Some("1.11.2".to_string()),
            }),
            ..SiteDescriptor::default()
        };

        codec.write_file(&path, &descriptor).unwrap();
        let read = codec.read_file(&path).unwrap();
        assert_eq!(read.skin, descriptor.skin);
        assert_eq!(read.model_encoding.as_deref(), Some("UTF-8"));
    }

    #[test]
    fn test_read_failure_names_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("site.xml");
        std::fs::write(&path, "<project><unclosed></project>").unwrap();

        let err = XmlDescriptorCodec::default().read_file(&path).unwrap_err();
        assert!(matches!(err, SiteError::DescriptorIo { action: "read", .. }));
    }
}
