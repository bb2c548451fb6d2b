use serde::{Deserialize, Serialize};

use super::parsing::header::Header;
use super::parsing::lines::{RawRecord, RECORD_ID_COLUMN};

/// Column order of the SCDL budget-line layout. Must stay in sync with
/// the serde renames on [`ScdlRecord`].
pub const SCDL_COLUMNS: [&str; 23] = [
    "BGT_ID",
    "BGT_NATDEC",
    "BGT_ANNEE",
    "BGT_SIRET",
    "BGT_NOM",
    "BGT_CONTNAT",
    "BGT_CONTNAT_LABEL",
    "BGT_NATURE",
    "BGT_NATURE_LABEL",
    "BGT_FONCTION",
    "BGT_FONCTION_LABEL",
    "BGT_OPERATION",
    "BGT_SECTION",
    "BGT_OPBUDG",
    "BGT_CODRD",
    "BGT_ARTSPE",
    "BGT_MTREAL",
    "BGT_MTBUDGPREC",
    "BGT_MTRARPREC",
    "BGT_MTPROPNOUV",
    "BGT_MTPREV",
    "BGT_CREDOUV",
    "BGT_MTRAR3112",
];

/// One budget line in the SCDL layout.
///
/// Every column is always present, possibly as an empty string. The
/// `contnat`/`operation`/`section` group and the three `*_label` columns
/// are reserved: the CFU source schema carries nothing to fill them.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ScdlRecord {
    #[serde(rename = "BGT_ID")]
    pub id: String,
    #[serde(rename = "BGT_NATDEC")]
    pub natdec: String,
    #[serde(rename = "BGT_ANNEE")]
    pub annee: String,
    #[serde(rename = "BGT_SIRET")]
    pub siret: String,
    #[serde(rename = "BGT_NOM")]
    pub nom: String,
    #[serde(rename = "BGT_CONTNAT")]
    pub contnat: String,
    #[serde(rename = "BGT_CONTNAT_LABEL")]
    pub contnat_label: String,
    #[serde(rename = "BGT_NATURE")]
    pub nature: String,
    #[serde(rename = "BGT_NATURE_LABEL")]
    pub nature_label: String,
    #[serde(rename = "BGT_FONCTION")]
    pub fonction: String,
    #[serde(rename = "BGT_FONCTION_LABEL")]
    pub fonction_label: String,
    #[serde(rename = "BGT_OPERATION")]
    pub operation: String,
    #[serde(rename = "BGT_SECTION")]
    pub section: String,
    #[serde(rename = "BGT_OPBUDG")]
    pub opbudg: String,
    #[serde(rename = "BGT_CODRD")]
    pub codrd: String,
    #[serde(rename = "BGT_ARTSPE")]
    pub artspe: String,
    #[serde(rename = "BGT_MTREAL")]
    pub mtreal: String,
    #[serde(rename = "BGT_MTBUDGPREC")]
    pub mtbudgprec: String,
    #[serde(rename = "BGT_MTRARPREC")]
    pub mtrarprec: String,
    #[serde(rename = "BGT_MTPROPNOUV")]
    pub mtpropnouv: String,
    #[serde(rename = "BGT_MTPREV")]
    pub mtprev: String,
    #[serde(rename = "BGT_CREDOUV")]
    pub credouv: String,
    #[serde(rename = "BGT_MTRAR3112")]
    pub mtrar3112: String,
}

/// Translate one raw budget line into the SCDL layout.
///
/// Missing raw fields become empty strings; unrecognized values for the
/// three coded fields fall through to their documented defaults rather
/// than failing.
pub fn map_to_scdl(raw: &RawRecord, header: &Header) -> ScdlRecord {
    let codrd = field(raw, "CodRD").to_uppercase();
    let artspe = field(raw, "ArtSpe").to_lowercase();
    let opbudg = field(raw, "OpBudg");

    ScdlRecord {
        id: field(raw, RECORD_ID_COLUMN).to_string(),

        natdec: "compte administratif".to_string(),
        annee: header.exercice.clone(),
        siret: header.siret.clone(),
        nom: header.nom.clone(),

        nature: field(raw, "Nature").to_string(),
        fonction: field(raw, "Fonction").to_string(),

        opbudg: if opbudg == "1" { "ordre" } else { "réel" }.to_string(),
        codrd: match codrd.as_str() {
            "D" => "dépense",
            "R" => "recette",
            _ => "",
        }
        .to_string(),
        artspe: match artspe.as_str() {
            "true" => "spécialisé",
            "false" => "non spécialisé",
            _ => "",
        }
        .to_string(),

        mtreal: field(raw, "MtReal").to_string(),
        mtbudgprec: field(raw, "MtBudgPrec").to_string(),
        mtrarprec: field(raw, "MtRARPrec").to_string(),
        mtpropnouv: field(raw, "MtPropNouv").to_string(),
        mtprev: field(raw, "MtPrev").to_string(),
        credouv: field(raw, "CredOuv").to_string(),
        mtrar3112: field(raw, "MtRAR3112").to_string(),

        ..Default::default()
    }
}

fn field<'a>(raw: &'a RawRecord, name: &str) -> &'a str {
    raw.get(name).map(String::as_str).unwrap_or("")
}
