//! Program catalog: resolving short program names to cutoff-table entries.
//!
//! Weight tables and cutoff tables come from independently maintained
//! sources and do not share program names. An explicit alias table maps each
//! short name to a fragment of the canonical name (or marks it as having no
//! published cutoff); the fragment must be contained in exactly one
//! cutoff-table key. Resolution happens once, at load time, so an ambiguous
//! alias fails fast instead of silently picking a match. Unmapped names are
//! an expected, reportable condition, never a failure.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::model::CutoffTable;

/// Default alias table: short weight-table names → canonical-name fragments.
/// `None` marks programs with no published cutoff.
pub const DEFAULT_ALIASES: &[(&str, Option<&str>)] = &[
    ("Administração (D)", Some("Administração (Integral")),
    ("Administração (N)", Some("Administração (Noturno")),
    ("Administração Púb/Soc (N)", Some("Administração Pública e Social")),
    ("Agronomia", Some("Agronomia (Integral)")),
    ("Arquitetura e Urbanismo", Some("Arquitetura e Urbanismo")),
    ("Arquivologia (N)", Some("Arquivologia")),
    ("Artes Visuais (B)", Some("Artes Visuais (Bacharelado")),
    ("Artes Visuais (L)", Some("Artes Visuais (Licenciatura")),
    ("Biblioteconomia", Some("Biblioteconomia")),
    ("Biomedicina", Some("Biomedicina")),
    ("Biotecnologia", Some("Biotecnologia")),
    ("Ciências Atuariais", Some("Ciências Atuariais")),
    ("Ciências B Bio Mar CLN", Some("Ciências Biológicas (Bacharelado, Pólo Imbé)")),
    ("Ciências Biológicas (B)", Some("Ciências Biológicas (Bacharelado, Campus do Vale)")),
    ("Ciências Biológicas (L)", Some("Ciências Biológicas (Licenciatura")),
    ("Ciências Contábeis", Some("Ciências Contábeis")),
    ("Ciências Econômicas (D)", Some("Ciências Econômicas (Integral")),
    ("Ciências Econômicas (N)", Some("Ciências Econômicas (Noturno")),
    ("Ciências Sociais (D)", Some("Ciências Sociais (Integral, Campus do Vale)")),
    ("Ciências Sociais (N)", Some("Ciências Sociais (Noturno, Campus do Vale)")),
    ("Computação", Some("Ciência da Computação")),
    ("Dança", Some("Dança")),
    ("Design Produto", Some("Design de Produto")),
    ("Design Visual", Some("Design Visual")),
    ("Direito (D)", Some("Ciências Jurídicas e Sociais – Direito (Integral")),
    ("Direito (N)", Some("Ciências Jurídicas e Sociais – Direito (Noturno")),
    ("Educação Física (B)", Some("ABI – Educação Física")),
    ("Enfermagem", Some("Enfermagem")),
    ("Engenharia Ambiental", Some("Engenharia Ambiental")),
    ("Engenharia Cartográfica (N)", Some("Engenharia Cartográfica")),
    ("Engenharia Civil", Some("Engenharia Civil")),
    ("Engenharia Contr Automação", Some("Engenharia de Controle e Automação")),
    ("Engenharia de Alimentos", Some("Engenharia de Alimentos")),
    ("Engenharia de Computação", Some("Engenharia de Computação")),
    ("Engenharia de Energia", Some("Engenharia de Energia")),
    ("Engenharia de Materiais", Some("Engenharia de Materiais")),
    ("Engenharia de Minas", Some("Engenharia de Minas")),
    ("Engenharia de Produção", Some("Engenharia de Produção")),
    ("Engenharia de Serviços", Some("Engenharia de Serviços")),
    ("Engenharia Elétrica", Some("Engenharia Elétrica")),
    ("Engenharia Física", Some("Engenharia Física")),
    ("Engenharia Gest Energia CLN", Some("Engenharia de Gestão de Energia")),
    ("Engenharia Hídrica", Some("Engenharia Hídrica")),
    ("Engenharia Mecânica", Some("Engenharia Mecânica")),
    ("Engenharia Metalúrgica", Some("Engenharia Metalúrgica")),
    ("Engenharia Química", Some("Engenharia Química")),
    ("Estatística", Some("Estatística")),
    ("Farmácia", Some("Farmácia")),
    ("Filosofia (B) (D)", Some("Filosofia (Integral")),
    ("Filosofia (L) (N)", Some("Filosofia (Noturno, Licenciatura")),
    ("Fisioterapia", Some("Fisioterapia")),
    ("Fonoaudiologia", Some("Fonoaudiologia")),
    ("Física (B)", Some("Física (Integral, Campus do Vale)")),
    ("Física (L) (D)", Some("Física (Licenciatura, Campus do Vale)")),
    ("Física (L) (N)", Some("Física (Noturno, Licenciatura")),
    ("Física Astrofísica", Some("Física (Integral, Campus do Vale)")),
    ("Geografia (D)", Some("Geografia (Bacharelado, Campus do Vale)")),
    ("Geografia (L) CLN", Some("Geografia (Noturno, Licenciatura, Campus Litoral Norte)")),
    ("Geografia (N)", Some("Geografia (Noturno, Bacharelado")),
    ("Geologia", Some("Geologia")),
    ("História (D)", Some("História (Integral, Bacharelado")),
    ("História (N)", Some("História (Noturno, Bacharelado")),
    ("História da Arte", Some("História da Arte")),
    ("Inter Ciência Tecno", Some("Interdisciplinar em Ciência e Tecnologia")),
    ("Jornalismo", Some("Jornalismo")),
    ("Letras (B)", Some("Letras (Bacharelado")),
    ("Letras (B) Libras", Some("Letras (Licenciatura")),
    ("Música", None),
    ("Nutrição", Some("Nutrição")),
    ("Odontologia (D)", Some("Odontologia (Integral")),
    ("Odontologia (N)", Some("Odontologia (Noturno")),
    ("Pedagogia (M)", Some("Pedagogia (Matutino")),
    ("Pedagogia (N)", Some("Pedagogia (Noturno")),
    ("Políticas Públicas", Some("Políticas Públicas")),
    ("Psicologia (D)", Some("Psicologia (Integral")),
    ("Psicologia (N)", Some("Psicologia (Noturno")),
    ("Publicidade & Propaganda", Some("Publicidade e Propaganda")),
    ("Química", Some("Química (Integral")),
    ("Química (L) (N)", Some("Química (Noturno, Licenciatura")),
    ("Química Industrial (I)", Some("Química Industrial (Integral")),
    ("Química Industrial (N)", Some("Química Industrial (Noturno")),
    ("Rel. Internacionais", Some("Relações Internacionais")),
    ("Relações Públicas", Some("Relações Públicas")),
    ("Saúde Coletiva", None),
    ("Serviço Social", None),
    ("Teatro", None),
    ("Teatro (L)", None),
    ("Zootecnia", None),
];

/// Short program name → canonical-name fragment, or `None` for programs
/// explicitly marked as having no published cutoff.
#[derive(Debug, Clone, Default)]
pub struct AliasTable {
    pub entries: BTreeMap<String, Option<String>>,
}

impl AliasTable {
    /// The built-in alias table.
    pub fn default_table() -> Self {
        Self {
            entries: DEFAULT_ALIASES
                .iter()
                .map(|(short, fragment)| {
                    ((*short).to_string(), fragment.map(str::to_string))
                })
                .collect(),
        }
    }
}

/// The outcome of resolving one program against the cutoff table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CutoffResolution {
    /// The alias fragment matched exactly one cutoff entry.
    Resolved { canonical: String, cutoff: f64 },
    /// The alias table explicitly marks this program as having no cutoff.
    Unavailable,
    /// No alias entry, or the fragment matched no cutoff entry.
    Unmapped,
}

impl CutoffResolution {
    pub fn cutoff(&self) -> Option<f64> {
        match self {
            CutoffResolution::Resolved { cutoff, .. } => Some(*cutoff),
            _ => None,
        }
    }
}

static UNMAPPED: CutoffResolution = CutoffResolution::Unmapped;

/// Per-program cutoff resolutions, computed once per run.
#[derive(Debug, Clone, Default)]
pub struct ProgramCatalog {
    resolutions: BTreeMap<String, CutoffResolution>,
}

impl ProgramCatalog {
    /// Resolve every program name against the alias and cutoff tables.
    ///
    /// Fails if any fragment is contained in more than one cutoff key: an
    /// ambiguous alias table is bad reference data, not a tie to break.
    pub fn build<'a>(
        programs: impl IntoIterator<Item = &'a str>,
        aliases: &AliasTable,
        cutoffs: &CutoffTable,
    ) -> Result<Self, ConfigError> {
        let mut resolutions = BTreeMap::new();
        for program in programs {
            let resolution = match aliases.entries.get(program) {
                None => CutoffResolution::Unmapped,
                Some(None) => CutoffResolution::Unavailable,
                Some(Some(fragment)) => {
                    let mut matches = cutoffs
                        .cutoffs
                        .iter()
                        .filter(|(name, _)| name.contains(fragment.as_str()));
                    match (matches.next(), matches.next()) {
                        (None, _) => CutoffResolution::Unmapped,
                        (Some((name, &cutoff)), None) => CutoffResolution::Resolved {
                            canonical: name.clone(),
                            cutoff,
                        },
                        (Some((first, _)), Some((second, _))) => {
                            let mut candidates = vec![first.clone(), second.clone()];
                            candidates.extend(matches.map(|(name, _)| name.clone()));
                            return Err(ConfigError::AmbiguousAlias {
                                program: program.to_string(),
                                alias: fragment.clone(),
                                candidates,
                            });
                        }
                    }
                }
            };
            resolutions.insert(program.to_string(), resolution);
        }
        Ok(Self { resolutions })
    }

    /// The resolution for a program; programs never seen at build time are
    /// unmapped.
    pub fn resolve(&self, program: &str) -> &CutoffResolution {
        self.resolutions.get(program).unwrap_or(&UNMAPPED)
    }

    /// Programs with no resolvable cutoff, in catalog order.
    pub fn unresolved(&self) -> impl Iterator<Item = &str> {
        self.resolutions
            .iter()
            .filter(|(_, r)| !matches!(r, CutoffResolution::Resolved { .. }))
            .map(|(name, _)| name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cutoffs(entries: &[(&str, f64)]) -> CutoffTable {
        CutoffTable {
            cutoffs: entries
                .iter()
                .map(|(name, cutoff)| (name.to_string(), *cutoff))
                .collect(),
        }
    }

    fn aliases(entries: &[(&str, Option<&str>)]) -> AliasTable {
        AliasTable {
            entries: entries
                .iter()
                .map(|(short, fragment)| (short.to_string(), fragment.map(str::to_string)))
                .collect(),
        }
    }

    #[test]
    fn resolves_unique_substring_match() {
        let catalog = ProgramCatalog::build(
            ["Computação"],
            &aliases(&[("Computação", Some("Ciência da Computação"))]),
            &cutoffs(&[("Ciência da Computação", 702.36), ("Engenharia Civil", 640.0)]),
        )
        .unwrap();
        assert_eq!(
            catalog.resolve("Computação"),
            &CutoffResolution::Resolved {
                canonical: "Ciência da Computação".into(),
                cutoff: 702.36
            }
        );
    }

    #[test]
    fn fragment_matches_longer_key() {
        let catalog = ProgramCatalog::build(
            ["Odontologia (D)"],
            &aliases(&[("Odontologia (D)", Some("Odontologia (Integral"))]),
            &cutoffs(&[
                ("Odontologia (Integral)", 712.9),
                ("Odontologia (Noturno)", 690.1),
            ]),
        )
        .unwrap();
        assert_eq!(
            catalog.resolve("Odontologia (D)").cutoff(),
            Some(712.9)
        );
    }

    #[test]
    fn unmapped_when_alias_missing_or_no_match() {
        let catalog = ProgramCatalog::build(
            ["Música", "Teatro", "Dança"],
            &aliases(&[("Música", Some("Música")), ("Teatro", None)]),
            &cutoffs(&[("Engenharia Civil", 640.0)]),
        )
        .unwrap();
        // Fragment present but contained in no cutoff key.
        assert_eq!(catalog.resolve("Música"), &CutoffResolution::Unmapped);
        // Explicitly marked as unavailable.
        assert_eq!(catalog.resolve("Teatro"), &CutoffResolution::Unavailable);
        // No alias entry at all.
        assert_eq!(catalog.resolve("Dança"), &CutoffResolution::Unmapped);
        assert_eq!(catalog.unresolved().count(), 3);
    }

    #[test]
    fn ambiguous_alias_fails_fast() {
        let err = ProgramCatalog::build(
            ["Física (B)"],
            &aliases(&[("Física (B)", Some("Física"))]),
            &cutoffs(&[("Física (Integral)", 600.0), ("Física (Noturno)", 580.0)]),
        )
        .unwrap_err();
        match err {
            ConfigError::AmbiguousAlias { candidates, .. } => {
                assert_eq!(candidates.len(), 2);
            }
            other => panic!("expected AmbiguousAlias, got {other}"),
        }
    }

    #[test]
    fn default_table_marks_known_gaps() {
        let table = AliasTable::default_table();
        assert_eq!(table.entries.get("Música"), Some(&None));
        assert!(matches!(table.entries.get("Computação"), Some(Some(_))));
    }
}
