fn main() -> anyhow::Result<()> {
    log_query::run()
}
