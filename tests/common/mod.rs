use std::io::{Error, Write};
use tempfile::NamedTempFile;

/// Writes `rows` as a command script, one row per line.
pub fn write_script(rows: &[&str]) -> Result<NamedTempFile, Error> {
    let mut file = NamedTempFile::new()?;
    for row in rows {
        writeln!(file, "{row}")?;
    }
    file.flush()?;
    Ok(file)
}

/// A script that issues `count` grants of 1 gold to the same user.
pub fn generate_grants(tenant: &str, count: usize) -> Result<NamedTempFile, Error> {
    let mut file = NamedTempFile::new()?;
    writeln!(file, "{tenant},createCurrency,gold,G,1")?;
    for _ in 0..count {
        writeln!(file, "{tenant},grantFunds,alice,gold,1")?;
    }
    file.flush()?;
    Ok(file)
}
