//! The `vestibench init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    // Create vestibench.toml
    if std::path::Path::new("vestibench.toml").exists() {
        println!("vestibench.toml already exists, skipping.");
    } else {
        std::fs::write("vestibench.toml", SAMPLE_CONFIG)?;
        println!("Created vestibench.toml");
    }

    // Create example reference data
    std::fs::create_dir_all("reference")?;
    let exam_path = std::path::Path::new("reference/exam.json");
    if exam_path.exists() {
        println!("reference/exam.json already exists, skipping.");
    } else {
        std::fs::write(exam_path, EXAMPLE_EXAM)?;
        println!("Created reference/exam.json");
    }

    println!("\nNext steps:");
    println!("  1. Edit vestibench.toml with your API keys");
    println!("  2. Add weight and cutoff tables under reference/");
    println!("  3. Run: vestibench validate --exam reference/exam.json \\");
    println!("       --weights reference/weights.json --cutoffs reference/cutoffs.json");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# vestibench configuration

[providers.anthropic]
type = "anthropic"
api_key = "${ANTHROPIC_API_KEY}"

[providers.openai]
type = "openai"
api_key = "${OPENAI_API_KEY}"

[providers.ollama]
type = "ollama"
base_url = "http://localhost:11434"

default_provider = "anthropic"
default_model = "claude-3-5-sonnet-20241022"
default_temperature = 0.3
parallelism = 4
"#;

const EXAMPLE_EXAM: &str = r#"{
  "provas_2024": {
    "estrutura_prova": {
      "dia_1": {
        "distribuicao": [
          {"materia": "Língua Portuguesa", "questoes": "1-15"},
          {"materia": "Literatura", "questoes": "16-20"},
          {"materia": "História", "questoes": "21-30"},
          {"materia": "Geografia", "questoes": "31-40"}
        ]
      },
      "dia_2": {
        "distribuicao": [
          {"materia": "Matemática", "questoes": "61-90"},
          {"materia": "Física", "questoes": "91-100"},
          {"materia": "Química", "questoes": "101-110"},
          {"materia": "Biologia", "questoes": "111-120"},
          {"materia": "Inglês", "questoes": "121-130"},
          {"materia": "Espanhol", "questoes": "121-130"}
        ]
      }
    },
    "estatisticas": {
      "portugues": {"media": 7.5, "desvio_padrao": 2.7},
      "literatura": {"media": 2.4, "desvio_padrao": 1.1},
      "historia": {"media": 4.9, "desvio_padrao": 2.0},
      "geografia": {"media": 5.1, "desvio_padrao": 2.1},
      "matematica": {"media": 12.3, "desvio_padrao": 5.6},
      "fisica": {"media": 4.2, "desvio_padrao": 2.0},
      "quimica": {"media": 4.0, "desvio_padrao": 2.1},
      "biologia": {"media": 4.6, "desvio_padrao": 2.1},
      "ingles": {"media": 5.3, "desvio_padrao": 2.3}
    }
  }
}
"#;
