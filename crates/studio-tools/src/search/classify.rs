/// Terms that mark a query as being about recent events
const NEWS_KEYWORDS: &[&str] = &[
    "notizie", "news", "ultime notizie", "recenti", "oggi", "ieri", "questa settimana",
    "elezioni", "politica", "governo", "parlamento", "presidente", "ministro",
    "economia", "borsa", "mercato", "inflazione", "crisi economica",
    "sport", "calcio", "partita", "campionato", "squadra",
    "emergenza", "catastrofe", "terremoto", "alluvione", "incidente",
    "scandalo", "caso", "indagine", "arresto", "processo",
    "summit", "conferenza", "vertice", "incontro internazionale",
    "lancio", "annuncio", "nuovo prodotto", "startup", "ipo",
    "normativa", "legge", "decreto", "regolamento", "cambiamento normativo",
    "cronaca", "eventi", "accadimenti", "sviluppi", "aggiornamenti",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryKind {
    General,
    News,
}

impl QueryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryKind::General => "general",
            QueryKind::News => "news",
        }
    }
}

/// Case-insensitive substring match against the news keyword list.
pub fn is_news_query(query: &str) -> bool {
    let lower = query.to_lowercase();
    NEWS_KEYWORDS.iter().any(|keyword| lower.contains(keyword))
}

pub fn classify(query: &str) -> QueryKind {
    if is_news_query(query) {
        QueryKind::News
    } else {
        QueryKind::General
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_news_keywords() {
        assert_eq!(classify("ultime notizie elezioni"), QueryKind::News);
        assert_eq!(classify("Risultati CALCIO serie A"), QueryKind::News);
        assert_eq!(classify("latest tech news"), QueryKind::News);
        assert_eq!(classify("Apple IPO rumours"), QueryKind::News);
    }

    #[test]
    fn test_general_queries() {
        assert_eq!(classify("ricetta della carbonara"), QueryKind::General);
        assert_eq!(classify("how does a heat pump work"), QueryKind::General);
        assert_eq!(classify(""), QueryKind::General);
    }

    #[test]
    fn test_classification_is_deterministic() {
        let query = "aggiornamenti sul decreto";
        assert_eq!(classify(query), classify(query));
        assert_eq!(classify(query).as_str(), "news");
    }
}
