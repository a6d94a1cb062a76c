//! Language packs: keyword lists and reply templates for one language
//!
//! A pack is plain data. Swapping packs changes what the user has to type and
//! what they read back, never how a message is dispatched. Packs can be built
//! in ([`LanguagePack::spanish`], [`LanguagePack::english`]) or loaded from a
//! TOML file, where any missing entry falls back to the Spanish pack.
//!
//! Reply templates use `{name}` placeholders filled by [`fill`].

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{OrionError, Result};

/// Keywords and replies for one language
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LanguagePack {
    /// Short identifier such as `es` or `en`
    pub name: String,

    #[serde(default)]
    pub keywords: Keywords,

    #[serde(default)]
    pub replies: Replies,
}

/// Substrings that trigger each intent
///
/// Matching is done against the lower-cased, trimmed message, so every entry
/// should be lower case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Keywords {
    pub greeting: Vec<String>,
    pub weather: Vec<String>,
    pub voice: Vec<String>,
    pub scrape: Vec<String>,
    pub translate: Vec<String>,
    pub calculate: Vec<String>,
    pub chart: Vec<String>,

    /// Chart words accepted next to an explicit CSV file name
    pub named_chart: Vec<String>,

    /// Marker identifying a CSV file name in the message
    pub csv_marker: String,

    pub bar: Vec<String>,
    pub line: Vec<String>,
    pub pie: Vec<String>,

    /// Words that end an interactive session
    pub exit: Vec<String>,
}

/// Reply texts and templates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Replies {
    pub greeting: String,
    pub voice_hint: String,
    pub scrape_hint: String,
    pub translate_hint: String,
    pub calculate_hint: String,
    pub empty_message: String,

    /// `{city}`, `{temperature}`, `{wind}`
    pub weather_report: String,
    /// `{error}`
    pub weather_error: String,
    pub unknown_temperature: String,
    pub unknown_wind: String,

    pub no_csv: String,
    pub csv_not_found: String,
    /// `{kind}`, `{file}`
    pub chart_success: String,
    /// `{file}`
    pub chart_created: String,
    /// `{error}`
    pub chart_error: String,
    /// `{kind}`, `{file}`
    pub chart_title: String,

    /// `{error}`
    pub model_error: String,
    /// `{error}`
    pub model_retry_exhausted: String,

    /// `{error}`
    pub search_error: String,
    pub search_empty: String,
    /// `{error}`
    pub translate_error: String,

    /// `{value}`
    pub calc_result: String,
    pub calc_rejected: String,
    /// `{error}`
    pub calc_error: String,

    pub goodbye: String,
}

fn words(list: &[&str]) -> Vec<String> {
    list.iter().map(|w| w.to_string()).collect()
}

impl Default for Keywords {
    fn default() -> Self {
        Self {
            greeting: words(&["hola", "buenos días", "buenas", "hey", "qué tal"]),
            weather: words(&["clima", "temperatura"]),
            voice: words(&["voz"]),
            scrape: words(&["scrapear", "extraer datos"]),
            translate: words(&["traducir"]),
            calculate: words(&["calcular", "cuánto es"]),
            chart: words(&["gráfico", "grafico", "visualizar"]),
            named_chart: words(&[
                "grafico", "gráfico", "barras", "pie", "circular", "linea", "línea",
            ]),
            csv_marker: ".csv".to_string(),
            bar: words(&["barras"]),
            line: words(&["líneas", "lineas", "línea", "linea"]),
            pie: words(&["pastel", "pie", "circular"]),
            exit: words(&["salir", "exit", "quit"]),
        }
    }
}

impl Default for Replies {
    fn default() -> Self {
        Self {
            greeting: "¡Hola! 👋 Soy tu agente conversacional. Puedo ayudarte con gráficos, voz, clima, traducción, búsqueda web y más.".into(),
            voice_hint: "Puedes usar la herramienta de voz diciendo: voz: Hola, ¿cómo estás?".into(),
            scrape_hint: "Para hacer scraping, escribe: scrape: https://ejemplo.com".into(),
            translate_hint: "Para traducir, escribe: traducir: texto al idioma destino (por ejemplo: traducir hola al inglés)".into(),
            calculate_hint: "Para cálculos, escribe: calcular: 5 * 8 + 3".into(),
            empty_message: "Escribe un mensaje para comenzar.".into(),
            weather_report: "En {city} hay {temperature}°C y viento de {wind} km/h 🌤️.".into(),
            weather_error: "No pude obtener el clima: {error}".into(),
            unknown_temperature: "desconocida".into(),
            unknown_wind: "desconocido".into(),
            no_csv: "❌ No encontré ningún archivo CSV cargado. Sube uno primero.".into(),
            csv_not_found: "No se encontró el archivo CSV.".into(),
            chart_success: "📈 Gráfico ({kind}) generado correctamente usando '{file}'.".into(),
            chart_created: "Gráfico creado: {file}".into(),
            chart_error: "⚠️ Ocurrió un error al generar el gráfico: {error}".into(),
            chart_title: "Gráfico tipo {kind} generado con '{file}'".into(),
            model_error: "Error al usar Gemini: {error}".into(),
            model_retry_exhausted: "Error persistente tras reintento: {error}".into(),
            search_error: "Error al buscar: {error}".into(),
            search_empty: "No se encontró información relevante.".into(),
            translate_error: "Error al traducir: {error}".into(),
            calc_result: "Resultado: {value}".into(),
            calc_rejected: "Expresión inválida.".into(),
            calc_error: "Error: {error}".into(),
            goodbye: "👋 Adiós.".into(),
        }
    }
}

impl Default for LanguagePack {
    fn default() -> Self {
        Self::spanish()
    }
}

impl LanguagePack {
    /// The default pack
    pub fn spanish() -> Self {
        Self {
            name: "es".to_string(),
            keywords: Keywords::default(),
            replies: Replies::default(),
        }
    }

    pub fn english() -> Self {
        Self {
            name: "en".to_string(),
            keywords: Keywords {
                greeting: words(&["hello", "good morning", "good afternoon", "hey", "what's up"]),
                weather: words(&["weather", "temperature"]),
                voice: words(&["voice"]),
                scrape: words(&["scrape", "extract data"]),
                translate: words(&["translate"]),
                calculate: words(&["calculate", "how much is"]),
                chart: words(&["chart", "graph", "plot", "visualize"]),
                named_chart: words(&["chart", "graph", "bar", "pie", "line"]),
                csv_marker: ".csv".to_string(),
                bar: words(&["bar"]),
                line: words(&["line"]),
                pie: words(&["pie"]),
                exit: words(&["exit", "quit", "bye"]),
            },
            replies: Replies {
                greeting: "Hello! 👋 I'm your conversational agent. I can help with charts, voice, weather, translation, web search and more.".into(),
                voice_hint: "You can use the voice tool by saying: voice: Hello, how are you?".into(),
                scrape_hint: "To scrape a page, type: scrape: https://example.com".into(),
                translate_hint: "To translate, type: translate: text to target language (for example: translate hola to english)".into(),
                calculate_hint: "For calculations, type: calculate: 5 * 8 + 3".into(),
                empty_message: "Type a message to get started.".into(),
                weather_report: "In {city} it is {temperature}°C with {wind} km/h wind 🌤️.".into(),
                weather_error: "Could not get the weather: {error}".into(),
                unknown_temperature: "unknown".into(),
                unknown_wind: "unknown".into(),
                no_csv: "❌ I couldn't find any uploaded CSV file. Upload one first.".into(),
                csv_not_found: "The CSV file was not found.".into(),
                chart_success: "📈 Chart ({kind}) generated from '{file}'.".into(),
                chart_created: "Chart created: {file}".into(),
                chart_error: "⚠️ An error occurred while generating the chart: {error}".into(),
                chart_title: "{kind} chart generated from '{file}'".into(),
                model_error: "Error using Gemini: {error}".into(),
                model_retry_exhausted: "Still failing after retry: {error}".into(),
                search_error: "Search failed: {error}".into(),
                search_empty: "No relevant information found.".into(),
                translate_error: "Translation failed: {error}".into(),
                calc_result: "Result: {value}".into(),
                calc_rejected: "Invalid expression.".into(),
                calc_error: "Error: {error}".into(),
                goodbye: "👋 Bye.".into(),
            },
        }
    }

    /// Look up a built-in pack by name
    pub fn builtin(name: &str) -> Result<Self> {
        match name.trim().to_lowercase().as_str() {
            "es" | "spanish" | "español" => Ok(Self::spanish()),
            "en" | "english" => Ok(Self::english()),
            other => Err(OrionError::LanguagePack(format!(
                "unknown built-in pack '{}' (expected 'es' or 'en')",
                other
            ))),
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let pack: LanguagePack = toml::from_str(content)
            .map_err(|e| OrionError::LanguagePack(format!("invalid pack: {}", e)))?;
        Ok(pack.normalized())
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            OrionError::LanguagePack(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }

    /// Lower-case every keyword so file-supplied packs match like built-in ones
    fn normalized(mut self) -> Self {
        let k = &mut self.keywords;
        for list in [
            &mut k.greeting,
            &mut k.weather,
            &mut k.voice,
            &mut k.scrape,
            &mut k.translate,
            &mut k.calculate,
            &mut k.chart,
            &mut k.named_chart,
            &mut k.bar,
            &mut k.line,
            &mut k.pie,
            &mut k.exit,
        ] {
            for word in list.iter_mut() {
                *word = word.to_lowercase();
            }
            list.retain(|w| !w.trim().is_empty());
        }
        k.csv_marker = k.csv_marker.to_lowercase();
        self
    }

    /// Whether `input` is one of the exit words
    pub fn is_exit_word(&self, input: &str) -> bool {
        let input = input.trim().to_lowercase();
        self.keywords.exit.iter().any(|w| *w == input)
    }
}

/// Whether `text` contains any of `keywords`
pub fn contains_any(text: &str, keywords: &[String]) -> bool {
    keywords.iter().any(|k| text.contains(k.as_str()))
}

/// Replace `{name}` placeholders in `template`
///
/// Unknown placeholders are left untouched.
pub fn fill(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = template.to_string();
    for (name, value) in vars {
        out = out.replace(&format!("{{{}}}", name), value);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill() {
        let pack = LanguagePack::spanish();
        let text = fill(
            &pack.replies.weather_report,
            &[("city", "Bogotá"), ("temperature", "18.5"), ("wind", "7")],
        );
        assert_eq!(text, "En Bogotá hay 18.5°C y viento de 7 km/h 🌤️.");
        assert_eq!(fill("{a} {b}", &[("a", "1")]), "1 {b}");
    }

    #[test]
    fn test_builtin_lookup() {
        assert_eq!(LanguagePack::builtin("ES").unwrap().name, "es");
        assert_eq!(LanguagePack::builtin("english").unwrap().name, "en");
        assert!(LanguagePack::builtin("fr").is_err());
    }

    #[test]
    fn test_partial_toml_falls_back_to_spanish() {
        let pack = LanguagePack::from_toml_str(
            r#"
            name = "pt"

            [keywords]
            greeting = ["Olá", "oi"]

            [replies]
            greeting = "Olá! 👋"
            "#,
        )
        .unwrap();

        assert_eq!(pack.name, "pt");
        assert_eq!(pack.keywords.greeting, vec!["olá", "oi"]);
        assert_eq!(pack.keywords.weather, Keywords::default().weather);
        assert_eq!(pack.replies.greeting, "Olá! 👋");
        assert_eq!(pack.replies.calc_rejected, "Expresión inválida.");
    }

    #[test]
    fn test_invalid_toml_is_pack_error() {
        let err = LanguagePack::from_toml_str("name = [").unwrap_err();
        assert!(matches!(err, OrionError::LanguagePack(_)));
    }

    #[test]
    fn test_exit_words() {
        let pack = LanguagePack::spanish();
        assert!(pack.is_exit_word("  Salir "));
        assert!(pack.is_exit_word("quit"));
        assert!(!pack.is_exit_word("salir ahora"));
    }
}
