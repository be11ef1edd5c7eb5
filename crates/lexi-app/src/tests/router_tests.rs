use std::sync::Arc;

use lexi_types::{ErrorKind, Settings};

use super::{StubTranslator, start};

fn settings(api_key: &str, model: &str) -> Settings {
    Settings {
        api_key: api_key.to_string(),
        model: model.to_string(),
    }
}

#[tokio::test]
async fn test_translate_without_credential_is_auth_failure() {
    let translator = Arc::new(StubTranslator::new(&[("ephemeral", "短暂的")]));
    let (controller, _tasks) = start(translator.clone());
    let client = controller.client();

    let response = client
        .translate_word("ephemeral", "An ephemeral joy.", "https://example.com")
        .await
        .unwrap();

    assert!(!response.success);
    assert_eq!(response.error_kind, Some(ErrorKind::Auth));
    assert!(response.error.is_some());
    assert_eq!(translator.calls(), 0);
    assert!(client.scan_page().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_translate_saves_then_updates() {
    let translator = Arc::new(StubTranslator::new(&[("ephemeral", "短暂的")]));
    let (controller, _tasks) = start(translator.clone());
    let client = controller.client();
    client.save_settings(settings("sk-test", "")).await.unwrap();

    let first = client
        .translate_word("Ephemeral", "Ephemeral joys.", "https://a.example")
        .await
        .unwrap();
    assert!(first.success);
    assert_eq!(first.translation.as_deref(), Some("短暂的"));
    assert_eq!(first.updated, Some(false));
    let added_at = client.scan_page().await.unwrap()[0].added_at;

    let second = client
        .translate_word("ephemeral", "An ephemeral thing.", "https://b.example")
        .await
        .unwrap();
    assert_eq!(second.updated, Some(true));

    let list = client.scan_page().await.unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0].word, "Ephemeral");
    assert_eq!(list[0].context, "An ephemeral thing.");
    assert_eq!(list[0].source_url, "https://b.example");
    assert_eq!(list[0].added_at, added_at);
    assert_eq!(translator.last_model(), None);
}

#[tokio::test]
async fn test_model_override_reaches_translator() {
    let translator = Arc::new(StubTranslator::new(&[("cat", "猫")]));
    let (controller, _tasks) = start(translator.clone());
    let client = controller.client();
    client
        .save_settings(settings(" sk-test ", " gpt-4o "))
        .await
        .unwrap();

    assert_eq!(
        client.get_settings().await.unwrap(),
        settings("sk-test", "gpt-4o")
    );
    client.translate_word("cat", "", "").await.unwrap();
    assert_eq!(translator.last_model().as_deref(), Some("gpt-4o"));
}

#[tokio::test]
async fn test_translator_errors_are_classified() {
    for (status, kind) in [(401, ErrorKind::Auth), (500, ErrorKind::Upstream)] {
        let translator = Arc::new(StubTranslator::new(&[("cat", "猫")]).with_status(status));
        let (controller, _tasks) = start(translator);
        let client = controller.client();
        client.save_settings(settings("sk-test", "")).await.unwrap();

        let response = client.translate_word("cat", "", "").await.unwrap();
        assert!(!response.success);
        assert_eq!(response.error_kind, Some(kind));
        assert!(client.scan_page().await.unwrap().is_empty());
    }

    let translator = Arc::new(StubTranslator::new(&[]));
    let (controller, _tasks) = start(translator);
    let client = controller.client();
    client.save_settings(settings("sk-test", "")).await.unwrap();

    let response = client.translate_word("unknown", "", "").await.unwrap();
    assert_eq!(response.error_kind, Some(ErrorKind::EmptyResponse));
}

#[tokio::test]
async fn test_panicking_handler_becomes_failure() {
    let translator = Arc::new(StubTranslator::new(&[("cat", "猫")]));
    let (controller, _tasks) = start(translator);
    let client = controller.client();
    client.save_settings(settings("sk-test", "")).await.unwrap();

    let response = client.translate_word("boom", "", "").await.unwrap();
    assert!(!response.success);
    assert_eq!(response.error_kind, Some(ErrorKind::Internal));

    // The router keeps serving
    let response = client.translate_word("cat", "", "").await.unwrap();
    assert!(response.success);
}

#[tokio::test]
async fn test_concurrent_translations_keep_one_entry() {
    let translator = Arc::new(StubTranslator::new(&[("cat", "猫")]));
    let (controller, _tasks) = start(translator);
    let client = controller.client();
    client.save_settings(settings("sk-test", "")).await.unwrap();

    let mut requests = Vec::new();
    for i in 0..10 {
        let client = client.clone();
        let word = if i % 2 == 0 { "cat" } else { "CAT" };
        requests.push(tokio::spawn(async move {
            client.translate_word(word, "", "").await.unwrap()
        }));
    }

    let mut added = 0;
    for request in requests {
        let response = request.await.unwrap();
        assert!(response.success);
        if response.updated == Some(false) {
            added += 1;
        }
    }

    assert_eq!(added, 1);
    assert_eq!(client.scan_page().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_delete_and_update() {
    let translator = Arc::new(StubTranslator::new(&[("cat", "猫"), ("dog", "狗")]));
    let (controller, _tasks) = start(translator);
    let client = controller.client();
    client.save_settings(settings("sk-test", "")).await.unwrap();
    client.translate_word("cat", "", "").await.unwrap();
    client.translate_word("dog", "", "").await.unwrap();

    let missing = client.update_word("bird", "鸟").await.unwrap();
    assert!(!missing.success);
    assert!(missing.error.is_some());
    assert_eq!(missing.list.len(), 2);

    let empty = client.update_word("cat", "   ").await.unwrap();
    assert!(!empty.success);

    let updated = client.update_word("CAT", "猫咪").await.unwrap();
    assert!(updated.success);
    let cat = updated.list.iter().find(|e| e.word == "cat").unwrap();
    assert_eq!(cat.translation, "猫咪");

    let after_delete = client.delete_word("DOG").await.unwrap();
    assert!(after_delete.success);
    assert_eq!(after_delete.list.len(), 1);

    let noop = client.delete_word("dog").await.unwrap();
    assert!(noop.success);
    assert_eq!(noop.list, after_delete.list);
}

#[tokio::test]
async fn test_page_commands_need_a_page() {
    let translator = Arc::new(StubTranslator::new(&[]));
    let (controller, _tasks) = start(translator);
    let client = controller.client();

    let scan = client.trigger_scan().await.unwrap();
    assert!(!scan.success);
    assert_eq!(scan.error.as_deref(), Some("No page is attached"));

    let remove = client.remove_highlight("cat").await.unwrap();
    assert!(!remove.success);
}

#[tokio::test]
async fn test_settings_default_to_empty() {
    let translator = Arc::new(StubTranslator::new(&[]));
    let (controller, _tasks) = start(translator);

    let settings = controller.client().get_settings().await.unwrap();
    assert_eq!(settings, Settings::default());
}

#[tokio::test]
async fn test_shutdown_stops_router() {
    let translator = Arc::new(StubTranslator::new(&[]));
    let (controller, mut tasks) = start(translator);

    controller.shutdown();
    let finished = tokio::time::timeout(std::time::Duration::from_secs(2), tasks.join_next())
        .await
        .unwrap();
    assert!(matches!(finished, Some(Ok(Ok(())))));
}
