use anyhow::Result;

pub fn run() -> Result<()> {
    println!("tabletalk {}", env!("CARGO_PKG_VERSION"));
    Ok(())
}
