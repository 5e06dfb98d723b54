use kawara::{BudgetEntry, ChartKind, ChartSpec, HouseholdBudgetData, Rgba8, ShowBuilder, Speaker};

fn main() -> anyhow::Result<()> {
    let show = ShowBuilder::news("年金5万円時代の生存戦略", 2400)
        .channel("本音ニュース", Rgba8::rgb(0x22, 0x8b, 0x22))
        .source("厚生労働省 年金財政検証")
        .narration("audio/ep7.wav")
        .background("backgrounds/studio.png")
        .quote("備えあれば憂いなし")
        .key_point("繰下げ受給で最大84%増")
        .key_point("平均受給額は月5万6千円")
        .line(Speaker::Katsumi, "皆さんこんにちは", 168, 400)
        .line(Speaker::Hiroshi, "今日は繰下げ受給の話です", 400, 700)
        .line(Speaker::Katsumi, "数字で見ていきましょう", 700, 1000)
        .chart(
            720,
            ChartSpec {
                kind: ChartKind::Bar,
                label: "繰下げ増額率".to_owned(),
                value: 84.0,
                unit: "%".to_owned(),
                max_value: Some(100.0),
                compare_value: None,
                compare_label: None,
                items: Vec::new(),
                subtitle: None,
                negative: false,
            },
        )
        .layout_documentary(HouseholdBudgetData {
            person_label: "73歳女性・一人暮らし".to_owned(),
            income: 56000,
            expenses: vec![
                BudgetEntry {
                    label: "家賃".to_owned(),
                    amount: 32000,
                },
                BudgetEntry {
                    label: "食費".to_owned(),
                    amount: 25000,
                },
            ],
        })
        .build()?;

    println!("{}", serde_json::to_string_pretty(&show)?);
    Ok(())
}
