use anyhow::Result;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use serde::{Deserialize, Serialize};

use super::tags::{attr_value, local_name};

/// Document-level facts shared by every normalized budget line.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Header {
    pub exercice: String,
    pub siret: String,
    pub nom: String,
}

impl Header {
    fn is_complete(&self) -> bool {
        !self.exercice.is_empty() && !self.siret.is_empty() && !self.nom.is_empty()
    }
}

/// Scan the document for the fiscal year (`Exercice`) and the reporting
/// entity (`Collectivite`).
///
/// The scan stops as soon as all three fields are known; in a well-formed
/// CFU document these elements precede the budget lines, so the bulk of
/// the file is never read. Fields that never show up stay empty.
pub fn parse_header(xml: &[u8]) -> Result<Header> {
    let mut header = Header::default();
    let mut reader = Reader::from_reader(xml);
    let mut buf = Vec::new();

    // Pending Exercice element whose value has to come from text content
    // rather than a V attribute.
    let mut exercice: Option<PendingExercice> = None;

    loop {
        let mut done = false;
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                let name = std::str::from_utf8(e.name().as_ref())?.to_string();
                match local_name(&name) {
                    "Exercice" => {
                        exercice = Some(PendingExercice {
                            v: attr_value(e, b"V")?,
                            text: String::new(),
                        });
                    }
                    "Collectivite" => {
                        read_collectivite(e, &mut header)?;
                        done = header.is_complete();
                    }
                    _ => {}
                }
            }
            Ok(Event::Empty(ref e)) => {
                let name = std::str::from_utf8(e.name().as_ref())?.to_string();
                match local_name(&name) {
                    "Exercice" => {
                        header.exercice = attr_value(e, b"V")?.unwrap_or_default();
                        done = header.is_complete();
                    }
                    "Collectivite" => {
                        read_collectivite(e, &mut header)?;
                        done = header.is_complete();
                    }
                    _ => {}
                }
            }
            Ok(Event::Text(ref e)) => {
                if let Some(pending) = exercice.as_mut() {
                    pending.text.push_str(&e.unescape()?);
                }
            }
            Ok(Event::End(ref e)) => {
                let name = std::str::from_utf8(e.name().as_ref())?.to_string();
                if local_name(&name) == "Exercice" {
                    if let Some(pending) = exercice.take() {
                        header.exercice = pending.into_value();
                        done = header.is_complete();
                    }
                }
            }
            Ok(Event::Eof) => done = true,
            Err(e) => return Err(anyhow::anyhow!("Error parsing XML: {}", e)),
            _ => (),
        }
        buf.clear();
        if done {
            break;
        }
    }

    Ok(header)
}

struct PendingExercice {
    v: Option<String>,
    text: String,
}

impl PendingExercice {
    fn into_value(self) -> String {
        // A V attribute wins even when empty; text content is a fallback.
        match self.v {
            Some(v) => v,
            None => self.text.trim().to_string(),
        }
    }
}

fn read_collectivite(e: &BytesStart, header: &mut Header) -> Result<()> {
    // Producers disagree on the attribute's case; an empty attribute
    // counts as absent and the previous value is kept.
    let mut siret = attr_value(e, b"Siret")?.filter(|v| !v.is_empty());
    if siret.is_none() {
        siret = attr_value(e, b"SIRET")?.filter(|v| !v.is_empty());
    }
    if let Some(siret) = siret {
        header.siret = siret;
    }

    if let Some(nom) = attr_value(e, b"Libelle")?.filter(|v| !v.is_empty()) {
        header.nom = nom;
    }
    Ok(())
}
