use anyhow::{anyhow, bail, Context, Result};
use icns::IconFamily;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;
use std::process::Command;

/// Strategy for turning the rendered high-resolution PNG into `icon.icns`.
/// Strategies are tried in order; an `Err` from `convert` means "try the
/// next one".
pub trait IcnsConverter {
    fn name(&self) -> &'static str;

    fn convert(&self, source_png: &Path, dest: &Path) -> Result<()>;

    /// Whether a success wrote a real ICNS container. The placeholder
    /// strategy reports `false` so the caller can note the format.
    fn produces_icns(&self) -> bool {
        true
    }
}

/// Result of walking a converter chain.
pub struct Conversion {
    pub converter: &'static str,
    pub real_icns: bool,
}

/// The default chain: the external tool the original pipeline preferred,
/// then an in-process encoder, then the documented-lossy PNG placeholder.
pub fn default_chain() -> Vec<Box<dyn IcnsConverter>> {
    vec![
        Box::new(ExternalConverter::png2icns()),
        Box::new(NativeConverter),
        Box::new(PngPlaceholder),
    ]
}

pub fn run_chain(
    chain: &[Box<dyn IcnsConverter>],
    source_png: &Path,
    dest: &Path,
) -> Result<Conversion> {
    let mut last_err = None;
    for converter in chain {
        match converter.convert(source_png, dest) {
            Ok(()) => {
                return Ok(Conversion {
                    converter: converter.name(),
                    real_icns: converter.produces_icns(),
                })
            }
            Err(err) => last_err = Some(err),
        }
    }
    Err(last_err.unwrap_or_else(|| anyhow!("no ICNS converter configured")))
}

/// Invokes a PNG-to-ICNS command-line tool found on `PATH`.
pub struct ExternalConverter {
    program: &'static str,
}

impl ExternalConverter {
    pub fn png2icns() -> Self {
        ExternalConverter {
            program: "png2icns",
        }
    }
}

impl IcnsConverter for ExternalConverter {
    fn name(&self) -> &'static str {
        self.program
    }

    fn convert(&self, source_png: &Path, dest: &Path) -> Result<()> {
        // png2icns takes the destination first.
        let status = Command::new(self.program)
            .arg(dest)
            .arg(source_png)
            .status()
            .with_context(|| format!("{} not found on PATH", self.program))?;
        if !status.success() {
            bail!("{} exited with {status}", self.program);
        }
        Ok(())
    }
}

/// Builds the ICNS container in-process with the `icns` crate.
pub struct NativeConverter;

impl IcnsConverter for NativeConverter {
    fn name(&self) -> &'static str {
        "native"
    }

    fn convert(&self, source_png: &Path, dest: &Path) -> Result<()> {
        let data = fs::read(source_png).context("Failed to read rendered PNG")?;
        let image = icns::Image::read_png(&data[..]).context("Failed to decode rendered PNG")?;

        let mut family = IconFamily::new();
        family
            .add_icon(&image)
            .context("Can't add image to the icns family")?;

        let mut out_file = BufWriter::new(File::create(dest)?);
        family.write(&mut out_file)?;
        out_file.flush()?;
        Ok(())
    }
}

/// Last resort: copies the PNG bytes to the `.icns` path. Not a conformant
/// ICNS file, but non-empty and decodable, which is what the downstream
/// packaging tool needs to pick it up.
pub struct PngPlaceholder;

impl IcnsConverter for PngPlaceholder {
    fn name(&self) -> &'static str {
        "png-placeholder"
    }

    fn produces_icns(&self) -> bool {
        false
    }

    fn convert(&self, source_png: &Path, dest: &Path) -> Result<()> {
        fs::copy(source_png, dest).context("Failed to write placeholder icon")?;
        Ok(())
    }
}
