//! `sheetsync range <a1-range> --occupied <n> --count <n>`

use anyhow::{Context, Result};
use clap::Args;

use sheetsync_core::SheetRange;
use sheetsync_pipeline::insert_range;

/// Arguments for `sheetsync range`.
#[derive(Args, Debug)]
pub struct RangeArgs {
    /// The configured range, e.g. `Sheet1!A1:A1000`.
    pub range: String,

    /// Rows the range read returned, header included.
    #[arg(long, default_value_t = 0)]
    pub occupied: usize,

    /// Rows to insert.
    #[arg(long, default_value_t = 1)]
    pub count: usize,
}

impl RangeArgs {
    pub fn run(self) -> Result<()> {
        let current = SheetRange::parse(&self.range)
            .with_context(|| format!("invalid range '{}'", self.range))?;
        let insert = insert_range(&current, self.occupied, self.count)
            .with_context(|| format!("cannot insert {} row(s) below '{current}'", self.count))?;
        println!("{}", insert.range);
        println!("max row: {}", insert.max_row);
        Ok(())
    }
}
