use kawara::{Evaluator, FrameIndex, Show};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let s = include_str!("../tests/data/news_show.json");
    let show: Show = serde_json::from_str(s)?;
    let eval = Evaluator::new(&show)?;

    for f in [0u64, 60, 200, 640, 700, 1440, 1700] {
        let scene = eval.evaluate(FrameIndex(f))?;
        let digest = eval.fingerprint(FrameIndex(f))?;
        println!(
            "frame {f}: {} nodes, {} cues, {}",
            scene.nodes.len(),
            scene.audio.len(),
            digest.to_hex()
        );
    }

    Ok(())
}
