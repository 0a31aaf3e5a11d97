use anyhow::{bail, Result};
use serde::{Deserialize, Deserializer, Serialize};

/// Numéros tirables : 01 à 25.
pub const UNIVERSE_SIZE: u8 = 25;
/// Nombre de numéros par tirage.
pub const DRAW_SIZE: usize = 15;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Prize {
    #[serde(default)]
    pub vencedores: u64,
    #[serde(default)]
    pub premio: f64,
}

/// Rangs de gains : 15, 14, 13, 12 et 11 numéros trouvés.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PrizeTiers {
    #[serde(default)]
    pub quinze: Prize,
    #[serde(default)]
    pub quatorze: Prize,
    #[serde(default)]
    pub treze: Prize,
    #[serde(default)]
    pub doze: Prize,
    #[serde(default)]
    pub onze: Prize,
}

/// Un tirage tel que stocké en amont. Les noms de champs sérialisés sont ceux
/// de la table d'origine et de l'API qui reçoit le rapport.
///
/// `contest_number` et `dezenas` sont optionnels : un enregistrement incomplet
/// doit pouvoir circuler jusqu'aux analyseurs, qui l'ignorent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DrawRecord {
    #[serde(rename = "concurso", default, skip_serializing_if = "Option::is_none")]
    pub contest_number: Option<u32>,
    #[serde(rename = "data", default)]
    pub draw_date: String,
    #[serde(
        rename = "dezenas",
        default,
        deserialize_with = "deserialize_dezenas",
        skip_serializing_if = "Option::is_none"
    )]
    pub dezenas: Option<Vec<String>>,
    #[serde(rename = "premiacoes", default)]
    pub prize_tiers: PrizeTiers,
    #[serde(rename = "acumulou", default)]
    pub accumulated: bool,
    #[serde(rename = "acumuladaProxConcurso", default)]
    pub next_contest_accumulated_value: f64,
    #[serde(rename = "dataProxConcurso", default)]
    pub next_contest_date: String,
    #[serde(rename = "proxConcurso", default, skip_serializing_if = "Option::is_none")]
    pub next_contest_number: Option<u32>,
    #[serde(rename = "timeCoracao", default)]
    pub heart_team: String,
    #[serde(rename = "mesSorte", default)]
    pub lucky_month: String,
}

impl DrawRecord {
    /// Construit un tirage minimal à partir de numéros entiers.
    pub fn new(contest_number: u32, numbers: &[u8]) -> Self {
        Self {
            contest_number: Some(contest_number),
            dezenas: Some(normalize_dezenas(numbers.iter().map(|&n| format_dezena(n)))),
            ..Default::default()
        }
    }

    /// Numéros du tirage appartenant à l'univers 1-25, après complément à
    /// deux caractères ("7" compte pour 07). Les valeurs hors univers sont
    /// ignorées silencieusement.
    pub fn numbers(&self) -> impl Iterator<Item = u8> + '_ {
        self.dezenas
            .iter()
            .flatten()
            .filter_map(|d| parse_dezena(&normalize_dezena(d)))
    }

    pub fn contains(&self, number: u8) -> bool {
        self.numbers().any(|n| n == number)
    }
}

pub fn format_dezena(number: u8) -> String {
    format!("{:02}", number)
}

/// "07" → Some(7). Seules les chaînes de deux chiffres dans 01-25 sont acceptées.
pub fn parse_dezena(value: &str) -> Option<u8> {
    if value.len() != 2 || !value.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let n: u8 = value.parse().ok()?;
    (1..=UNIVERSE_SIZE).contains(&n).then_some(n)
}

/// Complète à deux caractères les valeurs d'un seul caractère ("7" → "07").
pub fn normalize_dezena(value: &str) -> String {
    let value = value.trim();
    if value.len() == 1 {
        format!("0{}", value)
    } else {
        value.to_string()
    }
}

/// Normalise puis dédoublonne en conservant l'ordre de première apparition.
pub fn normalize_dezenas<I, S>(values: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out: Vec<String> = Vec::new();
    for value in values {
        let normalized = normalize_dezena(value.as_ref());
        if !out.contains(&normalized) {
            out.push(normalized);
        }
    }
    out
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawDezena {
    Int(i64),
    Float(f64),
    Text(String),
}

impl RawDezena {
    fn into_text(self) -> String {
        match self {
            RawDezena::Int(n) => format!("{:02}", n),
            RawDezena::Float(f) if f.fract() == 0.0 => format!("{:02}", f as i64),
            RawDezena::Float(f) => f.to_string(),
            RawDezena::Text(s) => s,
        }
    }
}

fn deserialize_dezenas<'de, D>(deserializer: D) -> std::result::Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<Vec<RawDezena>> = Option::deserialize(deserializer)?;
    Ok(raw.map(|values| normalize_dezenas(values.into_iter().map(RawDezena::into_text))))
}

pub fn validate_draw(draw: &DrawRecord) -> Result<()> {
    let Some(contest) = draw.contest_number else {
        bail!("Tirage sans numéro de concours");
    };
    let Some(dezenas) = &draw.dezenas else {
        bail!("Concours {} : aucune dezena", contest);
    };
    if dezenas.len() != DRAW_SIZE {
        bail!(
            "Concours {} : {} dezenas au lieu de {}",
            contest,
            dezenas.len(),
            DRAW_SIZE
        );
    }
    for d in dezenas {
        if parse_dezena(d).is_none() {
            bail!("Concours {} : dezena {:?} hors limites (01-25)", contest, d);
        }
    }
    Ok(())
}
