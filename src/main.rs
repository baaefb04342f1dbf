fn main() -> anyhow::Result<()> {
    mapsketch::run()?;
    Ok(())
}
