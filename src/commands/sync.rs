use crate::commands::{CommandReport, archive, discover};
use crate::vault::archiver::ArchiveMode;
use anyhow::Result;

/// One full pass: discovery first so the registry reflects upstream, then the
/// deep sweep over ended streams, then the cheap poll over live ones.
pub fn run() -> Result<CommandReport> {
    let mut report = CommandReport::new("sync");
    report.merge(discover::run()?);
    report.merge(archive::run(ArchiveMode::Ended)?);
    report.merge(archive::run(ArchiveMode::Live)?);
    Ok(report)
}
