use futures::future::BoxFuture;
use futures::FutureExt;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use crate::controller::{DeleteOutcome, SampleCurationController, SearchOutcome};
use crate::gate::{ActionKind, HeadlessModal};
use crate::notify::{MemoryNotifier, NoticeKind};
use crate::report::{synthesize, AnalysisReportCard, InconsistencyEntry, InconsistencyGroup};
use crate::service::{
    ClientOptions, HttpSampleService, MutationRequest, MutationResponse, PageLocation,
    SampleService, SearchRequest, ServiceError,
};
use crate::view::{ElementRef, FieldKey, SamplePage};

fn cnpj_card() -> AnalysisReportCard {
    AnalysisReportCard {
        file_name: Some("fornecedores.xlsx".to_string()),
        total: Some("10".to_string()),
        valid: Some("8".to_string()),
        invalid: Some("2".to_string()),
        inconsistencies: Some(vec![InconsistencyGroup {
            title: Some("Format errors".to_string()),
            entries: vec![InconsistencyEntry {
                label: Some("CNPJ".to_string()),
                text: "CNPJ — invalid check digit".to_string(),
                examples: Some(vec!["11.222.333/0001-99".to_string()]),
            }],
        }]),
    }
}

#[test]
fn report_lists_rate_reason_and_examples() {
    let text = synthesize(&[cnpj_card()]);
    let lines: Vec<&str> = text.lines().collect();
    assert!(lines.contains(&"• Taxa de sucesso: 80%"));
    assert!(lines.contains(&"FORMAT ERRORS:"));
    let entry = lines
        .iter()
        .position(|l| *l == "   - CNPJ*: invalid check digit")
        .unwrap();
    assert_eq!(lines[entry + 1], "      - 11.222.333/0001-99");
    assert_eq!(lines[entry + 2], "");
    assert_eq!(lines[entry + 3], "=== FIM DO RELATÓRIO ===");
}

#[test]
fn report_is_idempotent_and_separates_cards() {
    let cards = vec![cnpj_card(), AnalysisReportCard::default()];
    let first = synthesize(&cards);
    assert_eq!(first, synthesize(&cards));
    assert_eq!(first.matches("=== FIM DO RELATÓRIO ===\n\n").count(), 2);
    assert!(first.contains("=== FIM DO RELATÓRIO ===\n\n=== RELATÓRIO DE ANÁLISE"));
}

#[test]
fn group_without_title_still_lists_entries() {
    let card = AnalysisReportCard {
        inconsistencies: Some(vec![InconsistencyGroup {
            title: None,
            entries: vec![
                InconsistencyEntry {
                    label: Some("NCM".to_string()),
                    text: "NCM — vazio".to_string(),
                    examples: None,
                },
                InconsistencyEntry {
                    label: Some("CEST".to_string()),
                    text: "CEST — fora da tabela".to_string(),
                    examples: Some(vec!["99".to_string(), " 01 ".to_string()]),
                },
            ],
        }]),
        ..AnalysisReportCard::default()
    };
    let text = synthesize(&[card]);
    assert!(text.contains(
        "INCONSISTÊNCIAS ENCONTRADAS:\n   - NCM*: vazio\n\n   - CEST*: fora da tabela\n      - 99\n      - 01\n\n"
    ));
}

#[derive(Default)]
struct FixedService {
    samples: Vec<String>,
    reply: MutationResponse,
}

impl SampleService for FixedService {
    fn search(&self, _req: SearchRequest) -> BoxFuture<'_, Result<Vec<String>, ServiceError>> {
        let samples = self.samples.clone();
        async move { Ok(samples) }.boxed()
    }

    fn mutate(&self, _req: MutationRequest) -> BoxFuture<'_, Result<MutationResponse, ServiceError>> {
        let reply = self.reply.clone();
        async move { Ok(reply) }.boxed()
    }
}

fn controller<S: SampleService>(service: S) -> SampleCurationController<S, HeadlessModal, MemoryNotifier> {
    SampleCurationController::new(
        service,
        HeadlessModal::default(),
        MemoryNotifier::default(),
        PageLocation::new("https://app.local/history_ia?token=tk-1"),
    )
}

#[tokio::test]
async fn search_results_replace_list_and_are_deletable() {
    let mut ctl = controller(FixedService {
        samples: vec!["abc123".to_string(), "xabc".to_string()],
        ..FixedService::default()
    });
    let key = FieldKey::new("9", "DESCRICAO");
    let mut page = SamplePage::new();
    page.add_field(key.clone(), &["old".to_string()]);
    page.set_search_text(&key, "abc");

    let outcome = ctl
        .on_search_gesture(&mut page, &ElementRef::SearchInput(key.clone()))
        .await
        .unwrap();
    assert_eq!(outcome, SearchOutcome::Rendered { count: 2 });

    let field = page.field(&key).unwrap();
    let values: Vec<_> = field.items.iter().filter_map(|i| i.sample_value()).collect();
    assert_eq!(values, vec!["abc123", "xabc"]);
    assert_eq!(field.badge, "1");

    let target = page.find_item(&key, "xabc").unwrap();
    let attrs = page.delete_attrs(&target).unwrap();
    assert_eq!(attrs.layout, "9");
    assert_eq!(attrs.field, "DESCRICAO");
    ctl.on_delete_gesture(&page, &target).unwrap();
    assert_eq!(ctl.gate().pending().unwrap().kind(), ActionKind::DeleteValue);
}

#[tokio::test]
async fn confirmed_value_delete_removes_exactly_one_item() {
    let mut ctl = controller(FixedService {
        reply: MutationResponse {
            success: true,
            message: Some("Valor excluído com sucesso.".to_string()),
        },
        ..FixedService::default()
    });
    let key = FieldKey::new("9", "UNIDADE");
    let mut page = SamplePage::new();
    page.add_field(
        key.clone(),
        &["UN".to_string(), "CX".to_string(), "KG".to_string()],
    );

    let target = page.find_item(&key, "CX").unwrap();
    ctl.on_delete_gesture(&page, &target).unwrap();
    assert!(ctl.gate().is_open());
    assert_eq!(ctl.gate().presenter().hide_count, 0);

    let outcome = ctl.on_confirm(&mut page).await.unwrap();
    assert_eq!(
        outcome,
        DeleteOutcome::Applied {
            kind: ActionKind::DeleteValue,
            message: "Valor excluído com sucesso.".to_string()
        }
    );
    let values: Vec<_> = page
        .field(&key)
        .unwrap()
        .items
        .iter()
        .map(|i| i.text().to_string())
        .collect();
    assert_eq!(values, vec!["UN", "KG"]);
    let notice = ctl.notifier().last().unwrap();
    assert_eq!(notice.kind, NoticeKind::Success);
    assert_eq!(notice.duration.as_millis(), 3000);
    assert!(!ctl.gate().is_open());
    assert_eq!(ctl.gate().presenter().hide_count, 1);
}

#[tokio::test]
async fn confirmed_clear_empties_list_and_badge() {
    let mut ctl = controller(FixedService {
        reply: MutationResponse {
            success: true,
            message: Some("Campo limpo.".to_string()),
        },
        ..FixedService::default()
    });
    let key = FieldKey::new("9", "UNIDADE");
    let mut page = SamplePage::new();
    page.add_field(key.clone(), &["UN".to_string(), "CX".to_string()]);

    ctl.on_delete_gesture(&page, &ElementRef::ClearButton(key.clone()))
        .unwrap();
    assert!(ctl.gate().message().contains("TODAS as amostras"));
    ctl.on_confirm(&mut page).await.unwrap();

    let field = page.field(&key).unwrap();
    assert!(field.items.is_empty());
    assert_eq!(field.badge, "0");
}

#[tokio::test]
async fn cancel_sends_nothing() {
    let mut ctl = controller(FixedService::default());
    let key = FieldKey::new("9", "UNIDADE");
    let mut page = SamplePage::new();
    page.add_field(key.clone(), &["UN".to_string()]);
    ctl.on_delete_gesture(&page, &ElementRef::ClearButton(key.clone()))
        .unwrap();
    ctl.on_cancel();
    assert!(!ctl.gate().is_open());
    assert_eq!(ctl.on_confirm(&mut page).await, None);
    assert_eq!(page.field(&key).unwrap().items.len(), 1);
}

#[test]
fn backend_message_is_announced_as_info() {
    let mut ctl = controller(FixedService::default());
    let mut page = SamplePage::new();
    ctl.announce_backend_message(&page);
    assert!(ctl.notifier().notices.is_empty());

    page.set_backend_message(Some("Amostras atualizadas.".to_string()));
    ctl.announce_backend_message(&page);
    let notice = ctl.notifier().last().unwrap();
    assert_eq!(notice.kind, NoticeKind::Info);
    assert_eq!(notice.message, "Amostras atualizadas.");
}

fn find_subslice(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

// answers a single HTTP request with `body` and hands back the raw request
async fn serve_once(body: &'static str) -> (String, tokio::task::JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        let (mut sock, _) = listener.accept().await.unwrap();
        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];
        loop {
            let n = sock.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);
            if let Some(pos) = find_subslice(&buf, b"\r\n\r\n") {
                let head = String::from_utf8_lossy(&buf[..pos]).to_lowercase();
                let len = head
                    .lines()
                    .find_map(|l| l.strip_prefix("content-length:"))
                    .and_then(|v| v.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                if buf.len() >= pos + 4 + len {
                    break;
                }
            }
        }
        let resp = format!(
            "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
            body.len(),
            body
        );
        sock.write_all(resp.as_bytes()).await.unwrap();
        let _ = sock.shutdown().await;
        String::from_utf8_lossy(&buf).to_string()
    });
    (format!("http://{addr}"), handle)
}

fn http_service(base_url: String) -> HttpSampleService {
    HttpSampleService::new(&ClientOptions {
        base_url,
        timeout_seconds: Some(5),
        proxy: None,
    })
    .unwrap()
}

#[tokio::test]
async fn http_delete_posts_form_with_fresh_token() {
    let (base, server) = serve_once(r#"{"success": true, "mensagem": "Campo limpo."}"#).await;
    let mut ctl = controller(http_service(base));
    ctl.location()
        .navigate("https://app.local/history_ia?token=tk-2");

    let key = FieldKey::new("4", "COD PRODUTO");
    let mut page = SamplePage::new();
    page.add_field(key.clone(), &["A1".to_string()]);
    ctl.on_delete_gesture(&page, &ElementRef::ClearButton(key.clone()))
        .unwrap();
    let outcome = ctl.on_confirm(&mut page).await.unwrap();
    assert!(matches!(outcome, DeleteOutcome::Applied { .. }));

    let raw = server.await.unwrap();
    assert!(raw.starts_with("POST /history_ia/delete "));
    assert!(raw.contains("application/x-www-form-urlencoded"));
    assert!(raw.ends_with("token=tk-2&layout=4&campo=COD+PRODUTO&valor=&acao=delcampo"));
}

#[tokio::test]
async fn http_search_decodes_samples() {
    let (base, server) = serve_once(r#"{"amostras": ["abc123", "xabc"]}"#).await;
    let svc = http_service(base);
    let samples = svc
        .search(SearchRequest {
            token: "tk".to_string(),
            layout: "1".to_string(),
            field: "NCM".to_string(),
            term: "abc".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(samples, vec!["abc123".to_string(), "xabc".to_string()]);
    let raw = server.await.unwrap();
    assert!(raw.starts_with("POST /history_ia/busca_amostras "));
    assert!(raw.ends_with("termo=abc"));
}

#[tokio::test]
async fn http_search_without_samples_key_is_empty() {
    let (base, _server) = serve_once("{}").await;
    let svc = http_service(base);
    let samples = svc
        .search(SearchRequest {
            token: String::new(),
            layout: "1".to_string(),
            field: "NCM".to_string(),
            term: String::new(),
        })
        .await
        .unwrap();
    assert!(samples.is_empty());
}

#[tokio::test]
async fn unreachable_service_is_a_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let mut ctl = controller(http_service(format!("http://{addr}")));
    let key = FieldKey::new("4", "NCM");
    let mut page = SamplePage::new();
    page.add_field(key.clone(), &["1".to_string()]);
    let before = page.clone();

    let target = page.find_item(&key, "1").unwrap();
    ctl.on_delete_gesture(&page, &target).unwrap();
    let outcome = ctl.on_confirm(&mut page).await.unwrap();
    assert!(matches!(outcome, DeleteOutcome::Transport { .. }));
    assert_eq!(page, before);
    assert_eq!(ctl.notifier().last().unwrap().message, "Erro de conexão.");

    page.set_search_text(&key, "1");
    let outcome = ctl
        .on_search_gesture(&mut page, &ElementRef::SearchInput(key.clone()))
        .await
        .unwrap();
    assert_eq!(outcome, SearchOutcome::Failed);
    assert_eq!(page.field(&key).unwrap().items[0].text(), "Erro ao buscar.");
}
