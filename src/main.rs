use forest_ngin::{SceneConfig, flow};

fn main() -> anyhow::Result<()> {
    flow::run(SceneConfig::default())
}
