const ITALIAN_WORDS: &[&str] = &[
    "come", "cosa", "quando", "dove", "perché", "chi", "quale", "quali",
    "notizie", "oggi", "ieri", "domani", "questa", "questo", "questi",
    "italia", "italiano", "italiana", "roma", "milano", "napoli", "torino",
    "governo", "politica", "economia", "sport", "calcio", "squadra",
    "partita", "campionato", "serie", "juventus", "inter", "milan",
    "euro", "europa", "unione", "parlamento", "presidente", "ministro",
];

const ENGLISH_WORDS: &[&str] = &[
    "how", "what", "when", "where", "why", "who", "which", "news",
    "today", "yesterday", "tomorrow", "this", "these", "that",
    "italy", "italian", "rome", "milan", "naples", "turin",
    "government", "politics", "economy", "sport", "football", "team",
    "match", "championship", "league", "juventus", "inter",
    "euro", "europe", "union", "parliament", "president", "minister",
];

const ITALIAN_DOMAINS: &[&str] = &[
    "repubblica.it", "corriere.it", "ansa.it", "tgcom24.mediaset.it",
    "ilsole24ore.com", "gazzetta.it", "sky.it", "rainews.it",
    "adnkronos.com", "ilmessaggero.it", "lastampa.it", "ilgiornale.it",
    "ilfattoquotidiano.it", "huffingtonpost.it", "fanpage.it",
    "tuttosport.com", "calciomercato.com", "sportmediaset.it",
];

const ENGLISH_DOMAINS: &[&str] = &[
    "bbc.com", "cnn.com", "reuters.com", "nytimes.com", "washingtonpost.com",
    "guardian.com", "independent.co.uk", "telegraph.co.uk", "ft.com",
    "wsj.com", "bloomberg.com", "forbes.com", "techcrunch.com",
    "espn.com", "sports.yahoo.com", "skysports.com", "goal.com",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    Italian,
    English,
}

impl Language {
    pub fn code(&self) -> &'static str {
        match self {
            Language::Italian => "it",
            Language::English => "en",
        }
    }

    /// Preferred news outlets for this language
    pub fn include_domains(&self) -> Vec<String> {
        let domains = match self {
            Language::Italian => ITALIAN_DOMAINS,
            Language::English => ENGLISH_DOMAINS,
        };
        domains.iter().map(|d| d.to_string()).collect()
    }
}

/// Count known words from each list; the denser list wins and ties go to Italian.
/// With no known words, any accented vowel means Italian.
pub fn detect_language(query: &str) -> Language {
    let lower = query.to_lowercase();
    let italian = ITALIAN_WORDS.iter().filter(|w| lower.contains(*w)).count();
    let english = ENGLISH_WORDS.iter().filter(|w| lower.contains(*w)).count();

    if italian == 0 && english == 0 {
        let has_accents = lower.chars().any(|c| "àèéìíîòóùú".contains(c));
        return if has_accents { Language::Italian } else { Language::English };
    }

    if italian >= english {
        Language::Italian
    } else {
        Language::English
    }
}
