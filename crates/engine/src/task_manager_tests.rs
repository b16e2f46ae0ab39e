// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use de_bus::{Bus, FakeBus, Message};
use de_core::{ChannelState, GenerationId, Product, StateCell};
use de_dataspace::{DataBlock, DataSpace, InMemoryDataSpace, TaskManagerId};
use de_modules::{Module, ModuleDeclaration, ModuleError, ModuleKind};
use serde_json::json;

use super::*;

struct Doubler {
    produces: BTreeSet<Product>,
    consumes: BTreeSet<Product>,
}

#[async_trait]
impl Module for Doubler {
    fn produces(&self) -> &BTreeSet<Product> {
        &self.produces
    }

    fn consumes(&self) -> &BTreeSet<Product> {
        &self.consumes
    }

    async fn step(&self, input: DataBlock) -> Result<DataBlock, ModuleError> {
        let raw = input.products.get(&Product::from("raw")).and_then(|v| v.as_i64()).unwrap_or(0);
        let mut out = input;
        out.products.insert(Product::from("doubled"), json!(raw * 2));
        Ok(out)
    }
}

struct Faulty;

#[async_trait]
impl Module for Faulty {
    fn produces(&self) -> &BTreeSet<Product> {
        static EMPTY: std::sync::OnceLock<BTreeSet<Product>> = std::sync::OnceLock::new();
        EMPTY.get_or_init(BTreeSet::new)
    }

    fn consumes(&self) -> &BTreeSet<Product> {
        static EMPTY: std::sync::OnceLock<BTreeSet<Product>> = std::sync::OnceLock::new();
        EMPTY.get_or_init(BTreeSet::new)
    }

    async fn step(&self, _input: DataBlock) -> Result<DataBlock, ModuleError> {
        Err(ModuleError::Step { module: "faulty".to_string(), message: "boom".to_string() })
    }
}

async fn wait_for_state(state: &Arc<StateCell>, target: ChannelState, timeout: Duration) {
    let deadline = tokio::time::Instant::now() + timeout;
    while state.get() != target {
        if tokio::time::Instant::now() >= deadline {
            panic!("timed out waiting for state {target:?}, got {:?}", state.get());
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}

#[tokio::test]
async fn advances_a_generation_through_a_single_transform() {
    let source_id = TaskManagerId::from("src-a");
    let channel_id = TaskManagerId::from("ch1");
    let dataspace: Arc<dyn DataSpace> = Arc::new(InMemoryDataSpace::new());
    dataspace
        .put(DataBlock::new(source_id.clone(), GenerationId::FIRST, 0).with_product(Product::from("raw"), json!(5)))
        .await
        .unwrap();

    let bus: Arc<dyn Bus> = Arc::new(FakeBus::new());
    let state = Arc::new(StateCell::new(ChannelState::Boot));

    let decl = ModuleDeclaration {
        name: "double".to_string(),
        module_class: "test.Doubler".to_string(),
        kind: ModuleKind::Transform,
        produces: BTreeSet::from([Product::from("doubled")]),
        consumes: BTreeSet::from([Product::from("raw")]),
        config: serde_json::Value::Null,
    };
    let plan = WorkflowPlan { order: vec!["double".to_string()] };
    let mut modules_by_name: std::collections::HashMap<String, Arc<dyn Module>> = std::collections::HashMap::new();
    modules_by_name.insert(
        "double".to_string(),
        Arc::new(Doubler { produces: decl.produces.clone(), consumes: decl.consumes.clone() }),
    );

    let cfg = TaskManagerConfig {
        channel: "ch1".to_string(),
        plan,
        modules: vec![decl],
        queue_info: vec![("source.a".to_string(), "source.a".to_string())],
    };

    let handle = tokio::spawn(run_task_manager(cfg, Arc::clone(&state), bus.clone(), dataspace.clone(), modules_by_name));

    wait_for_state(&state, ChannelState::Steady, Duration::from_secs(2)).await;

    let announcement = SourceAnnouncement {
        taskmanager_id: "src-a".to_string(),
        generation: GenerationId::FIRST.value(),
        products: BTreeSet::from([Product::from("raw")]),
    };
    bus.publish("source.a", Message::new("source.a", serde_json::to_vec(&announcement).unwrap())).await.unwrap();

    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    loop {
        if let Some(block) = dataspace.latest(&channel_id).await.unwrap() {
            assert_eq!(block.products.get(&Product::from("doubled")), Some(&json!(10)));
            break;
        }
        if tokio::time::Instant::now() >= deadline {
            panic!("timed out waiting for the channel's first generation");
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    state.set(ChannelState::Offline);
    tokio::time::timeout(Duration::from_secs(2), handle).await.unwrap().unwrap().unwrap();
    assert_eq!(state.get(), ChannelState::Shutdown);
}

#[tokio::test]
async fn a_module_fault_drives_the_channel_into_error() {
    let source_id = TaskManagerId::from("src-b");
    let dataspace: Arc<dyn DataSpace> = Arc::new(InMemoryDataSpace::new());
    dataspace.put(DataBlock::new(source_id.clone(), GenerationId::FIRST, 0)).await.unwrap();

    let bus: Arc<dyn Bus> = Arc::new(FakeBus::new());
    let state = Arc::new(StateCell::new(ChannelState::Boot));

    let decl = ModuleDeclaration {
        name: "faulty".to_string(),
        module_class: "test.Faulty".to_string(),
        kind: ModuleKind::Transform,
        produces: BTreeSet::new(),
        consumes: BTreeSet::new(),
        config: serde_json::Value::Null,
    };
    let plan = WorkflowPlan { order: vec!["faulty".to_string()] };
    let mut modules_by_name: std::collections::HashMap<String, Arc<dyn Module>> = std::collections::HashMap::new();
    modules_by_name.insert("faulty".to_string(), Arc::new(Faulty));

    let cfg = TaskManagerConfig {
        channel: "ch2".to_string(),
        plan,
        modules: vec![decl],
        queue_info: vec![("source.b".to_string(), "source.b".to_string())],
    };

    let handle = tokio::spawn(run_task_manager(cfg, Arc::clone(&state), bus.clone(), dataspace, modules_by_name));
    wait_for_state(&state, ChannelState::Steady, Duration::from_secs(2)).await;

    let announcement = SourceAnnouncement {
        taskmanager_id: "src-b".to_string(),
        generation: GenerationId::FIRST.value(),
        products: BTreeSet::new(),
    };
    bus.publish("source.b", Message::new("source.b", serde_json::to_vec(&announcement).unwrap())).await.unwrap();

    let result = tokio::time::timeout(Duration::from_secs(2), handle).await.unwrap().unwrap();
    assert!(result.is_err());
    assert_eq!(state.get(), ChannelState::Error);
}
