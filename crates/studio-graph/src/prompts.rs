//! System instructions, rebuilt for every turn so the model always sees the
//! current date in the deployment's timezone.

use chrono::{DateTime, Datelike, Duration, Timelike, Utc};
use chrono_tz::Tz;
use studio_types::AgentProfile;

pub const DEFAULT_TIMEZONE: &str = "Europe/Rome";

const WEEKDAYS: [&str; 7] = ["lunedì", "martedì", "mercoledì", "giovedì", "venerdì", "sabato", "domenica"];
const MONTHS: [&str; 12] = [
    "gennaio", "febbraio", "marzo", "aprile", "maggio", "giugno",
    "luglio", "agosto", "settembre", "ottobre", "novembre", "dicembre",
];

/// Current moment rendered for the prompt
#[derive(Debug, Clone, PartialEq)]
pub struct TimeInfo {
    /// e.g. "giovedì 16 ottobre 2025"
    pub current_date: String,
    /// "HH:MM"
    pub current_time: String,
    pub iso_date: String,
    pub iso_datetime: String,
    pub timezone: String,
    pub tomorrow: String,
    pub yesterday: String,
}

impl TimeInfo {
    pub fn at(now: DateTime<Utc>, tz: Tz) -> Self {
        let local = now.with_timezone(&tz);
        let date = local.date_naive();
        let weekday = WEEKDAYS[local.weekday().num_days_from_monday() as usize];
        let month = MONTHS[local.month0() as usize];

        Self {
            current_date: format!("{} {} {} {}", weekday, local.day(), month, local.year()),
            current_time: format!("{:02}:{:02}", local.hour(), local.minute()),
            iso_date: date.format("%Y-%m-%d").to_string(),
            iso_datetime: local.to_rfc3339(),
            timezone: tz.name().to_string(),
            tomorrow: (date + Duration::days(1)).format("%Y-%m-%d").to_string(),
            yesterday: (date - Duration::days(1)).format("%Y-%m-%d").to_string(),
        }
    }
}

/// Everything the system prompt depends on
#[derive(Debug, Clone)]
pub struct PromptContext {
    pub time: TimeInfo,
    /// Connector tools available this turn
    pub connector_tools: usize,
}

impl PromptContext {
    pub fn new(now: DateTime<Utc>, tz: Tz, connector_tools: usize) -> Self {
        Self {
            time: TimeInfo::at(now, tz),
            connector_tools,
        }
    }
}

/// Parse an IANA timezone name
pub fn parse_timezone(name: &str) -> anyhow::Result<Tz> {
    name.parse::<Tz>()
        .map_err(|e| anyhow::anyhow!("Invalid timezone '{}': {}", name, e))
}

pub fn system_prompt(agent: &AgentProfile, ctx: &PromptContext) -> String {
    let mut sections = Vec::new();

    if agent.planning_workflow {
        sections.push(format!(
            "Sei un assistente AI chiamato {}, progettato per aiutare gli utenti con conversazioni generali e supporto tecnico.",
            agent.name
        ));
        sections.push(WORKFLOW_SECTION.to_string());
    } else {
        sections.push("Sei un assistente AI utile e cordiale.".to_string());
    }

    sections.push(time_section(&ctx.time));

    if agent.builtin_tools.iter().any(|t| t == studio_tools::SMART_SEARCH) {
        sections.push(SEARCH_SECTION.to_string());
    }
    sections.push(LANGUAGE_SECTION.to_string());

    if agent.connectors && ctx.connector_tools > 0 {
        sections.push(connector_section(ctx.connector_tools));
    }

    sections.join("\n\n")
}

const WORKFLOW_SECTION: &str = "METODO DI LAVORO:
1. ANALISI: valuta se la richiesta è complessa o semplice.
   - Complessa (più azioni o strumenti): usa il tool \"taskPlanning\" passando solo la richiesta dell'utente.
   - Semplice (domanda diretta, azione singola): procedi direttamente.
2. ESECUZIONE: se hai un piano, seguilo task per task usando gli strumenti appropriati.
3. COMPLETAMENTO: alla fine invoca SEMPRE \"taskCompleted\" con un breve riepilogo. È l'unico modo per terminare.
Non fermarti prima di aver completato tutte le azioni richieste.";

const SEARCH_SECTION: &str = "RICERCA:
Hai un solo strumento di ricerca, \"smartSearch\", che sceglie da solo tra ricerca web generale e ricerca notizie.
- Usalo per informazioni generali (guide, definizioni, dati, prodotti, persone, luoghi) e per notizie recenti (cronaca, politica, economia, sport, annunci).
- Una sola ricerca per richiesta.
Dopo una ricerca le fonti sono già mostrate all'utente: rispondi in 2-3 frasi, senza ripetere il riepilogo o elencare di nuovo le fonti.
Segui l'indicazione contenuta nel campo 'languageInstruction' del risultato.";

const LANGUAGE_SECTION: &str = "LINGUA:
Rispondi SEMPRE nella stessa lingua del messaggio dell'utente e non cambiarla durante la conversazione.";

fn time_section(time: &TimeInfo) -> String {
    format!(
        "INFORMAZIONI TEMPORALI CORRENTI:
- Data e ora attuale: {} alle {}
- Data ISO: {}
- Data e ora ISO completa: {}
- Fuso orario: {}

Riferimenti temporali da usare sempre, senza basarti sulle tue conoscenze:
- OGGI = {}
- DOMANI = {}
- IERI = {}
Per eventi e appuntamenti usa il formato ISO (YYYY-MM-DD).",
        time.current_date,
        time.current_time,
        time.iso_date,
        time.iso_datetime,
        time.timezone,
        time.iso_date,
        time.tomorrow,
        time.yesterday,
    )
}

fn connector_section(count: usize) -> String {
    format!(
        "INTEGRAZIONI DISPONIBILI:
Hai accesso a {} strumenti aggiuntivi dalle app che l'utente ha connesso (ad esempio Gmail, Slack, Google Calendar, GitHub).
Usali quando l'utente ti chiede di eseguire azioni su queste piattaforme.",
        count
    )
}
