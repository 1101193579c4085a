use sitebot_core::config::Config;
use sitebot_core::traits::Embedder;
use sitebot_embed::embedder_from_settings;

fn main() -> anyhow::Result<()> {
    let settings = Config::load()?.settings()?;
    let embedder = embedder_from_settings(&settings.embedder)?;
    let texts = vec!["bridge abutment".to_string(), "pile cap reinforcement".to_string()];
    let embs = embedder.embed_batch(&texts)?;
    println!("B={} dim={} id={}", embs.len(), embedder.dim(), embedder.embedder_id());
    Ok(())
}
