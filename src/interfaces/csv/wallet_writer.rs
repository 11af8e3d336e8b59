use crate::application::engine::WalletRow;
use crate::error::Result;
use std::io::Write;

/// Writes the final wallet table as CSV with the header
/// `tenant,user,currency,balance`.
pub struct WalletWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> WalletWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    pub fn write_wallets(&mut self, rows: &[WalletRow]) -> Result<()> {
        self.writer
            .write_record(["tenant", "user", "currency", "balance"])?;
        for row in rows {
            self.writer.write_record([
                row.tenant.as_str(),
                row.user.as_str(),
                row.currency.as_str(),
                row.balance.to_string().as_str(),
            ])?;
        }
        self.writer.flush()?;
        Ok(())
    }
}
