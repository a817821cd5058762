use std::sync::Arc;
use tokio::time::{Duration, sleep};

use beacon_core::{
    Consumer, ConsumerOptions, Content, LifecycleState, NoopTransition, Scope, ScopeOptions,
};

fn print_frame(label: &str, consumer: &Consumer) {
    let frame = consumer.observe();
    println!(
        "[{label}] state={:?} content={:?} transition={} ({}ms)",
        frame
            .state_key
            .map(|s| s.as_str())
            .unwrap_or("unset"),
        frame.content,
        frame.class_name,
        frame.timeout.as_millis(),
    );
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    // (A) Scope を 1 つ開く（レジストリ + scope 全体のデフォルト）
    let scope = Scope::with_options(ScopeOptions {
        default_loading_content: Some(Content::text("spinner")),
        default_transition_name: Some("fade-blur".to_string()),
        default_transition_duration: Some(Duration::from_millis(200)),
    });

    // (B) Consumer を key "greet" に束ねて、状態遷移のコールバックを仕込む
    let consumer = Arc::new(
        scope
            .consumer(
                "greet",
                None,
                Content::text("Hello, beacon!"),
                ConsumerOptions::new()
                    .on_loading_start(|| println!("  -> loading started"))
                    .on_loading_end(|| println!("  -> loading ended"))
                    .on_error(|| println!("  -> errored")),
            )
            .unwrap(),
    );
    let _subscription = Consumer::attach(&consumer);
    print_frame("before", &consumer);

    // (C) delay 付きの run（最低 100ms はローディング表示を見せる）
    let controller = scope.controller("greet", None).unwrap();
    let result = controller
        .run(
            || async {
                sleep(Duration::from_millis(50)).await;
                Ok::<_, String>("greeting loaded")
            },
            Some(Duration::from_millis(100)),
        )
        .await;
    println!("run result: {result:?}");
    consumer.render(&NoopTransition).await;
    print_frame("after", &consumer);

    // (D) 失敗するタスク：エラーはそのまま呼び出し元へ、状態は error に
    let failing = scope.controller("doomed", None).unwrap();
    let err = failing
        .run(|| async { Err::<(), _>("backend unavailable".to_string()) }, None)
        .await;
    println!("doomed result: {err:?}");

    // (E) index 付きキー：リスト行ごとに独立して追跡できる
    for row in 0..3u32 {
        let row_controller = scope.controller("row", Some(row)).unwrap();
        row_controller
            .run(
                move || async move {
                    sleep(Duration::from_millis(10 * u64::from(row) + 5)).await;
                    Ok::<_, String>(row)
                },
                None,
            )
            .await
            .unwrap();
    }
    let row1 = scope.loader("row", Some(1)).unwrap();
    println!("row__1 view: {}", serde_json::to_string(&row1.view()).unwrap());

    // (F) 状態カウントのダンプ
    println!(
        "counts: {}",
        serde_json::to_string(&scope.counts()).unwrap()
    );

    // (G) teardown 後の書き込みは捨てられるが、結果は届く
    let late = scope.controller("late", None).unwrap();
    let run = late.run(
        || async {
            sleep(Duration::from_millis(20)).await;
            Ok::<_, String>("too late")
        },
        None,
    );
    scope.teardown();
    println!("late result after teardown: {:?}", run.await);
    println!(
        "late state stayed: {:?}",
        scope
            .registry()
            .get(late.key())
            .map(|s: LifecycleState| s.as_str())
    );
}
