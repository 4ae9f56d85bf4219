//! Persistence across runtime restarts: scripts reload from disk and the
//! PERSISTENT variable scope survives a stop/start cycle.

use std::sync::Arc;

use runtime::{
    FileScriptRepository, FileVariableRepository, PlayerDirectory, Runtime, TriggerEvent,
    WorldSink,
};
use script_core::{
    BlockRef, CodeBlock, DataValue, EventKind, ItemStack, Location, NoSlots, Owner, PlayerId,
    Scope,
};
use tempfile::TempDir;

struct SilentWorld;

impl WorldSink for SilentWorld {
    fn send_message(&self, _player: PlayerId, _message: &str) {}
    fn broadcast(&self, _message: &str) {}
    fn teleport(&self, _player: PlayerId, _destination: &Location) {}
    fn give_item(&self, _player: PlayerId, _item: &ItemStack) {}
    fn set_block(&self, _location: &Location, _material: &str) {}
    fn create_explosion(&self, _location: &Location, _power: f32) {}
}

struct NoPlayers;

impl PlayerDirectory for NoPlayers {
    fn has_permission(&self, _player: PlayerId, _permission: &str) -> bool {
        false
    }

    fn is_online(&self, _player: PlayerId) -> bool {
        false
    }
}

fn start(dir: &TempDir) -> Runtime {
    Runtime::builder()
        .with_world(Arc::new(SilentWorld))
        .with_players(Arc::new(NoPlayers))
        .with_script_repository(Arc::new(FileScriptRepository::new(dir.path()).unwrap()))
        .with_variable_repository(Arc::new(FileVariableRepository::new(dir.path()).unwrap()))
        .build()
        .expect("runtime builds")
}

#[tokio::test]
async fn scripts_reload_after_restart() {
    let dir = TempDir::new().unwrap();

    let rows = vec![vec![
        CodeBlock::event(BlockRef(0), "block_break"),
        CodeBlock::action(BlockRef(1), "broadcast")
            .with_parameter("message", DataValue::text("a block fell")),
    ]];

    let first = start(&dir);
    let compiled = first
        .handle()
        .compile_and_save("mine", &rows, &NoSlots)
        .unwrap();
    first.shutdown().await.unwrap();

    let second = start(&dir);
    let handle = second.handle();
    assert_eq!(handle.script_names(), vec!["mine"]);
    assert_eq!(*handle.script("mine").unwrap(), compiled);

    // The reloaded script still runs.
    let reports = handle
        .dispatch(TriggerEvent::new(EventKind::BlockBreak))
        .await
        .unwrap();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].executed, 1);

    second.shutdown().await.unwrap();
}

#[tokio::test]
async fn persistent_variables_survive_restart() {
    let dir = TempDir::new().unwrap();

    let first = start(&dir);
    first
        .handle()
        .variables()
        .set(
            Scope::Persistent,
            Owner::None,
            "total_joins",
            DataValue::Number(41.0),
        )
        .unwrap();
    // Non-persistent scopes must not leak into the snapshot.
    first
        .handle()
        .variables()
        .set(Scope::Global, Owner::None, "scratch", DataValue::Number(1.0))
        .unwrap();
    first.shutdown().await.unwrap();

    let second = start(&dir);
    let variables = second.handle().variables();
    assert_eq!(
        variables.get(Scope::Persistent, Owner::None, "total_joins"),
        Some(DataValue::Number(41.0))
    );
    assert_eq!(variables.get(Scope::Global, Owner::None, "scratch"), None);

    second.shutdown().await.unwrap();
}

#[tokio::test]
async fn enabled_flag_is_persisted() {
    let dir = TempDir::new().unwrap();

    let rows = vec![vec![CodeBlock::event(BlockRef(0), "player_join")]];

    let first = start(&dir);
    first
        .handle()
        .compile_and_save("idle", &rows, &NoSlots)
        .unwrap();
    first.handle().set_script_enabled("idle", false).unwrap();
    first.shutdown().await.unwrap();

    let second = start(&dir);
    assert!(!second.handle().script("idle").unwrap().enabled);
    second.shutdown().await.unwrap();
}
