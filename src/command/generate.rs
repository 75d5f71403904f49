use crate::args::Generate;
use crate::config::config_holder::ConfigHolder;
use crate::config::toml::ConfigToml;
use schemars::{Schema, schema_for};
use std::{
    fs::File,
    io::{BufWriter, Write as _, stdout},
    path::PathBuf,
};

pub(crate) async fn generate(generate: Generate) -> Result<(), anyhow::Error> {
    match generate {
        Generate::Config { output, overwrite } => {
            ConfigHolder::generate_default_config(output, overwrite).await
        }
        Generate::ConfigSchema { output } => write_config_schema(output),
    }
}

fn config_schema() -> Schema {
    schema_for!(ConfigToml)
}

fn write_config_schema(output: Option<PathBuf>) -> Result<(), anyhow::Error> {
    let schema = config_schema();
    if let Some(output) = output {
        let mut writer = BufWriter::new(File::create(&output)?);
        serde_json::to_writer_pretty(&mut writer, &schema)?;
        writer.write_all(b"\n")?;
        writer.flush()?; // Do not swallow errors
    } else {
        let mut stdout = stdout().lock();
        serde_json::to_writer_pretty(&mut stdout, &schema)?;
        writeln!(stdout)?;
    }
    Ok(())
}
