fn main() -> anyhow::Result<()> {
    lily_ngin::run()
}
