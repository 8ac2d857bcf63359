fn main() -> anyhow::Result<()> {
    env_logger::init();
    jzt_script::run()
}
