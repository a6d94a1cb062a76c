//! Integration tests for message dispatch

mod common;

use common::{harness, harness_with, ScriptedModel};
use llm::HistoryTurn;
use orion::{DispatchRequest, ErrorClass, IntentKind, LanguagePack};
use uuid::Uuid;

const SALES: &str = "mes,ventas,costos\nene,10,7\nfeb,12,8\nmar,9,6\n";

#[tokio::test]
async fn test_greeting_is_canned() {
    let h = harness(ScriptedModel::replying("unused"));
    let reply = h.engine.handle("Hola").await;

    assert_eq!(reply.text, LanguagePack::spanish().replies.greeting);
    assert_eq!(reply.artifact, None);
    assert_eq!(reply.intent, Some(IntentKind::Greeting));
    assert_eq!(reply.class, None);
    assert_eq!(h.model.calls(), 0);
}

#[tokio::test]
async fn test_hints_are_canned() {
    let h = harness(ScriptedModel::replying("unused"));
    let replies = LanguagePack::spanish().replies;

    assert_eq!(h.engine.handle("quiero usar la voz").await.text, replies.voice_hint);
    assert_eq!(h.engine.handle("traducir algo").await.text, replies.translate_hint);
    assert_eq!(h.engine.handle("calcular cosas").await.text, replies.calculate_hint);
    assert_eq!(h.model.calls(), 0);
}

#[tokio::test]
async fn test_blank_message_skips_model() {
    let h = harness(ScriptedModel::replying("unused"));
    let reply = h.engine.handle("   ").await;

    assert_eq!(reply.text, LanguagePack::spanish().replies.empty_message);
    assert_eq!(h.model.calls(), 0);
}

#[tokio::test]
async fn test_weather_failure_surfaces_error_text() {
    let h = harness(ScriptedModel::replying("unused"));
    let reply = h.engine.handle("¿cómo está el clima?").await;

    assert!(reply.text.starts_with("No pude obtener el clima: "));
    assert!(reply.text.len() > "No pude obtener el clima: ".len());
    assert_eq!(reply.class, Some(ErrorClass::UpstreamUnavailable));
    assert_eq!(reply.intent, Some(IntentKind::Weather));
}

#[tokio::test]
async fn test_chart_without_csv() {
    let h = harness(ScriptedModel::replying("unused"));
    let reply = h.engine.handle("muéstrame un gráfico").await;

    assert_eq!(reply.text, LanguagePack::spanish().replies.no_csv);
    assert_eq!(reply.artifact, None);
    assert_eq!(reply.class, Some(ErrorClass::DataError));
}

#[tokio::test]
async fn test_chart_uses_latest_csv() {
    let h = harness(ScriptedModel::replying("unused"));
    h.write_csv("ventas.csv", SALES);

    let reply = h.engine.handle("gráfico de barras x=mes y=ventas,costos").await;

    assert_eq!(
        reply.text,
        "📈 Gráfico (bar) generado correctamente usando 'ventas.csv'."
    );
    let artifact = reply.artifact.expect("chart attached");
    assert!(artifact.exists());
    let name = artifact.file_name().unwrap().to_string_lossy().into_owned();
    assert!(name.starts_with("chart-bar-"));

    let plans = h.renderer.plans.lock().unwrap();
    assert_eq!(plans.len(), 1);
    assert_eq!(plans[0].len(), 2);
    assert_eq!(
        plans[0].title.as_deref(),
        Some("Gráfico tipo bar generado con 'ventas.csv'")
    );
}

#[tokio::test]
async fn test_chart_missing_column_is_data_error() {
    let h = harness(ScriptedModel::replying("unused"));
    h.write_csv("ventas.csv", SALES);

    let reply = h.engine.handle("gráfico x=mes y=ganancia").await;

    assert!(reply.text.starts_with("⚠️ Ocurrió un error al generar el gráfico: "));
    assert!(reply.text.contains("ganancia"));
    assert_eq!(reply.artifact, None);
    assert_eq!(reply.class, Some(ErrorClass::DataError));
}

#[tokio::test]
async fn test_named_csv_chart() {
    let h = harness(ScriptedModel::replying("unused"));
    h.write_csv("Ventas-2024.csv", SALES);

    let reply = h.engine.handle("haz un pie con Ventas-2024.csv").await;

    assert_eq!(reply.intent, Some(IntentKind::ChartFromNamedCsv));
    let artifact = reply.artifact.expect("chart attached");
    assert!(reply.text.starts_with("Gráfico creado: chart-pie-"));
    assert!(artifact.exists());
}

#[tokio::test]
async fn test_named_csv_missing_file() {
    let h = harness(ScriptedModel::replying("unused"));
    let reply = h.engine.handle("barras con otro.csv").await;

    assert_eq!(reply.text, LanguagePack::spanish().replies.csv_not_found);
    assert_eq!(reply.class, Some(ErrorClass::DataError));
    assert_eq!(reply.artifact, None);
}

#[tokio::test]
async fn test_second_chart_replaces_first_in_session() {
    let h = harness(ScriptedModel::replying("unused"));
    h.write_csv("ventas.csv", SALES);
    let session = Uuid::new_v4();

    let first = h
        .engine
        .handle_request(DispatchRequest::new("gráfico de barras").with_session(session))
        .await
        .artifact
        .unwrap();
    let second = h
        .engine
        .handle_request(DispatchRequest::new("gráfico de líneas").with_session(session))
        .await
        .artifact
        .unwrap();

    assert_ne!(first, second);
    assert!(!first.exists());
    assert!(second.exists());
}

#[tokio::test]
async fn test_fallback_attaches_session_chart_only() {
    let h = harness(ScriptedModel::new(vec![
        Ok("Rust es un lenguaje.".into()),
        Ok("Otra respuesta.".into()),
    ]));
    h.write_csv("ventas.csv", SALES);
    let mine = Uuid::new_v4();

    let chart = h
        .engine
        .handle_request(DispatchRequest::new("gráfico").with_session(mine))
        .await
        .artifact
        .unwrap();

    let reply = h
        .engine
        .handle_request(DispatchRequest::new("¿Qué es Rust?").with_session(mine))
        .await;
    assert_eq!(reply.text, "Rust es un lenguaje.");
    assert_eq!(reply.artifact, Some(chart));

    let other = h
        .engine
        .handle_request(DispatchRequest::new("¿Y Go?").with_session(Uuid::new_v4()))
        .await;
    assert_eq!(other.artifact, None);
}

#[tokio::test]
async fn test_attach_last_chart_disabled() {
    let h = harness_with(ScriptedModel::replying("ok"), |config| {
        config.artifacts.attach_last_chart = false;
    });
    h.write_csv("ventas.csv", SALES);

    assert!(h.engine.handle("gráfico").await.artifact.is_some());
    assert_eq!(h.engine.handle("¿Qué es Rust?").await.artifact, None);
}

#[tokio::test]
async fn test_history_reaches_model() {
    let h = harness(ScriptedModel::replying("Claro."));
    let request = DispatchRequest::new("¿y después?")
        .with_history(vec![HistoryTurn::user("Hola"), HistoryTurn::model("¡Hola!")]);

    h.engine.handle_request(request).await;

    let seen = h.model.requests();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].prompt, "¿y después?");
    assert_eq!(seen[0].history.len(), 2);
}

#[tokio::test]
async fn test_calculate_operation() {
    let h = harness(ScriptedModel::replying("unused"));

    assert_eq!(h.engine.calculate("5 * 8 + 3").text, "Resultado: 43");

    let rejected = h.engine.calculate("import os");
    assert_eq!(rejected.text, "Expresión inválida.");
    assert_eq!(rejected.class, Some(ErrorClass::InputRejected));

    let failed = h.engine.calculate("1 / 0");
    assert_eq!(failed.text, "Error: division by zero");
    assert_eq!(failed.class, Some(ErrorClass::DataError));
}

#[tokio::test]
async fn test_search_and_translate_failures() {
    let h = harness(ScriptedModel::replying("unused"));

    let search = h.engine.search("rust").await;
    assert!(search.text.starts_with("Error al buscar: "));
    assert_eq!(search.class, Some(ErrorClass::UpstreamUnavailable));

    let translated = h.engine.translate("hola", Some("en")).await;
    assert!(translated.text.starts_with("Error al traducir: "));
    assert_eq!(translated.class, Some(ErrorClass::UpstreamUnavailable));
}

#[tokio::test]
async fn test_chart_from_file_operation() {
    let h = harness(ScriptedModel::replying("unused"));
    let csv = h.write_csv("datos.csv", SALES);

    let ok = h
        .engine
        .chart_from_file(&csv, orion::ChartSpec::new(orion::ChartKind::Line))
        .await;
    assert!(ok.artifact.is_some());
    assert!(ok.text.starts_with("Gráfico creado: "));

    let missing = h
        .engine
        .chart_from_file(&h.data_dir().join("nada.csv"), orion::ChartSpec::default())
        .await;
    assert_eq!(missing.class, Some(ErrorClass::DataError));
}

#[tokio::test]
async fn test_english_pack_changes_words_not_routing() {
    let h = harness_with(ScriptedModel::replying("unused"), |config| {
        config.language.pack = "en".into();
    });

    let reply = h.engine.handle("hello there").await;
    assert_eq!(reply.intent, Some(IntentKind::Greeting));
    assert_eq!(reply.text, LanguagePack::english().replies.greeting);

    assert_eq!(h.engine.calculate("2 + 2").text, "Result: 4");
}

#[tokio::test]
async fn test_concurrent_charts_get_distinct_files() {
    let h = harness(ScriptedModel::replying("unused"));
    h.write_csv("ventas.csv", SALES);

    let (a, b) = tokio::join!(
        h.engine
            .handle_request(DispatchRequest::new("gráfico").with_session(Uuid::new_v4())),
        h.engine
            .handle_request(DispatchRequest::new("gráfico").with_session(Uuid::new_v4())),
    );

    let (a, b) = (a.artifact.unwrap(), b.artifact.unwrap());
    assert_ne!(a, b);
    assert!(a.exists() && b.exists());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_charts_in_one_session_stay_on_disk() {
    let h = harness(ScriptedModel::replying("unused"));
    h.write_csv("ventas.csv", SALES);

    for _ in 0..25 {
        let session = Uuid::new_v4();
        let (a, b) = tokio::join!(
            h.engine
                .handle_request(DispatchRequest::new("gráfico de barras").with_session(session)),
            h.engine
                .handle_request(DispatchRequest::new("gráfico de líneas").with_session(session)),
        );

        let (a, b) = (a.artifact.unwrap(), b.artifact.unwrap());
        assert!(a.exists(), "returned chart was deleted: {}", a.display());
        assert!(b.exists(), "returned chart was deleted: {}", b.display());

        let latest = h.engine.artifacts().latest_for(session).unwrap();
        assert!(latest == a || latest == b);
    }
}
