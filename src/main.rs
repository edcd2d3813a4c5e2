use clap::Parser;

fn main() -> anyhow::Result<()> {
    let cfg = certbind::config::Config::parse();
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(certbind::run(cfg))
}
