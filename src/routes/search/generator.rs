use rand::Rng;
use rand::seq::IndexedRandom;
use serde::Serialize;

struct Industry {
    name: &'static str,
    templates: &'static [&'static str],
    emoji: &'static str,
    tags: &'static [&'static str],
}

// `{word}` is replaced with the capitalized query
const INDUSTRIES: &[Industry] = &[
    Industry {
        name: "Technology",
        templates: &[
            "{word} Intelligence Revolutionizing Everything",
            "{word} Innovation Reaching Excellence",
            "Fast {word} Integration, Real Excellence",
            "Fueling {word}, Reaching Everyone",
            "Forward-thinking {word} Engine",
        ],
        emoji: "🚀",
        tags: &["tech", "innovation", "future"],
    },
    Industry {
        name: "Social Media",
        templates: &[
            "Flex It, Run {word}",
            "Fresh {word} Ideas, Real Energy",
            "{word} Influence, Real Engagement",
            "Fun Interactive {word} Experience",
            "Fierce Independent {word} Energy",
        ],
        emoji: "🔥",
        tags: &["social", "genz", "viral"],
    },
    Industry {
        name: "Entertainment",
        templates: &[
            "Fun Interactive {word} Entertainment",
            "{word} Inspiring Real Excitement",
            "Fresh {word} Ideas, Raw Entertainment",
            "Fantastic {word} Reality Experience",
            "Fierce Independent {word} Entertainment",
        ],
        emoji: "🎭",
        tags: &["entertainment", "fun", "creative"],
    },
];

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedAcronym {
    pub acronym: String,
    pub full_form: String,
    pub industry: String,
    pub context: String,
    pub popularity: u32,
    pub trending: bool,
    pub tags: Vec<String>,
    pub emoji: String,
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// One candidate expansion per industry for `query`.
pub fn generate_acronyms<R: Rng + ?Sized>(query: &str, rng: &mut R) -> Vec<GeneratedAcronym> {
    let word = query.trim().to_lowercase();
    let capitalized = capitalize(&word);

    INDUSTRIES
        .iter()
        .enumerate()
        .map(|(index, industry)| {
            let template = industry.templates.choose(&mut *rng).copied().unwrap_or("{word}");
            let lead = if industry.name == "Social Media" {
                "Perfect for"
            } else {
                "Commonly used in"
            };

            GeneratedAcronym {
                acronym: query.trim().to_uppercase(),
                full_form: template.replace("{word}", &capitalized),
                industry: industry.name.to_string(),
                context: format!(
                    "{} {} when describing {}-related content and innovations.",
                    lead,
                    industry.name.to_lowercase(),
                    word
                ),
                popularity: rng.random_range(70..100u32) + index as u32 * 5,
                trending: rng.random_bool(0.7),
                tags: industry.tags.iter().map(|t| t.to_string()).collect(),
                emoji: industry.emoji.to_string(),
            }
        })
        .collect()
}
