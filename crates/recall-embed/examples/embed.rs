use recall_core::config::Config;
use recall_embed::EmbeddingProvider;

fn main() -> anyhow::Result<()> {
    let settings = Config::load()?.settings()?;
    let provider = EmbeddingProvider::from_settings(&settings)?;
    let texts = vec!["hello world".to_string(), "rust embeddings".to_string()];
    for (text, emb) in texts.iter().zip(provider.embed_batch(&texts)) {
        let emb = emb?;
        println!("{:?} -> dim={} backend={}", text, emb.len(), provider.name());
    }
    Ok(())
}
