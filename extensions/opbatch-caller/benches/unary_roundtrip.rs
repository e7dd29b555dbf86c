use criterion::{Criterion, criterion_group, criterion_main};
use opbatch::interceptor::{ClientRpcInfo, Interceptor, interceptor_fn};
use opbatch::metadata::MetadataMap;
use opbatch::{Call, CompletionQueue, CompletionSender, Status, StatusCode};
use opbatch_caller::{
    UnaryCallerInterface, UnaryEndpoint, UnaryEndpointInterface, UnaryResponse,
    error::CallerError,
};
use opbatch_loopback::{LoopbackConnector, loopback};
use std::{hint::black_box, sync::Arc};
use tokio::runtime::Runtime;

const ADD: &str = "/math.Math/Add";

struct BenchClient {
    connector: LoopbackConnector,
    interceptors: Vec<Arc<dyn Interceptor>>,
}

#[async_trait::async_trait]
impl UnaryCallerInterface for BenchClient {
    fn open_call(
        &self,
        rpc_info: ClientRpcInfo,
        completion_sender: CompletionSender,
    ) -> Result<Call, CallerError> {
        self.connector
            .connect(rpc_info, completion_sender)
            .map(|(call, _)| call)
            .map_err(|e| Status::new(StatusCode::Unavailable, e.to_string()).into())
    }

    fn get_interceptors(&self) -> Vec<Arc<dyn Interceptor>> {
        self.interceptors.clone()
    }
}

async fn add(values: Vec<f64>, _metadata: MetadataMap) -> Result<f64, Status> {
    Ok(values.iter().sum())
}

fn bench_roundtrip(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();

    let (connector, mut listener) = loopback();

    let endpoint = UnaryEndpoint::new();
    rt.block_on(endpoint.register_unary(ADD, add)).unwrap();

    // Server loop lives for the whole benchmark
    rt.spawn(async move {
        while let Some(incoming) = listener.accept().await {
            let endpoint = endpoint.clone();
            tokio::spawn(async move {
                let mut cq = CompletionQueue::new();
                let (call, _) = incoming.into_call(Vec::new(), cq.sender());
                let _ = endpoint.serve_call(&call, &mut cq).await;
            });
        }
    });

    let plain = BenchClient {
        connector: connector.clone(),
        interceptors: Vec::new(),
    };

    let passthrough = (0..4)
        .map(|_| interceptor_fn(|methods| methods.proceed()))
        .collect();
    let intercepted = BenchClient {
        connector,
        interceptors: passthrough,
    };

    c.bench_function("unary_add_loopback", |b| {
        b.to_async(&rt).iter(|| async {
            let res: UnaryResponse<f64> = plain
                .call_unary(ADD, &vec![1.0, 2.0, 3.0], MetadataMap::new())
                .await
                .unwrap();
            black_box(res.message);
        });
    });

    c.bench_function("unary_add_loopback_4_interceptors", |b| {
        b.to_async(&rt).iter(|| async {
            let res: UnaryResponse<f64> = intercepted
                .call_unary(ADD, &vec![1.0, 2.0, 3.0], MetadataMap::new())
                .await
                .unwrap();
            black_box(res.message);
        });
    });
}

criterion_group!(benches, bench_roundtrip);
criterion_main!(benches);
