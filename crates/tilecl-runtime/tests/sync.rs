use std::sync::Arc;

use pretty_assertions::assert_eq;
use tilecl_runtime::{
    config::HardwareProperties,
    sync::{
        CubeToVector, EdgeState, FlagId, SyncEdge, SyncFabric, VectorToCube, ViaGlobal, ViaOnChip,
    },
    CoreId, CubeEngine, DeviceBuffer, Engine, InstructionTrace, LaunchError, Launcher, Pipe,
    VectorEngine,
};

const ROUNDS: u32 = 6;

#[test_log::test]
fn cube_to_vector_double_buffering() {
    let launcher = Launcher::with_properties(HardwareProperties::default()).unwrap();
    let edge = SyncEdge::<CubeToVector, ViaGlobal>::new(FlagId(0), FlagId(1)).with_depth(2);
    let slots = DeviceBuffer::zeros(2 * 4);
    let sums = DeviceBuffer::zeros(2 * 4);

    launcher
        .launch_mix(
            |cube| {
                let mut producer = edge.producer(cube);
                for round in 0..ROUNDS {
                    producer.allocate();
                    slots.write((round as usize % 2) * 4, round + 1);
                    producer.record();
                }
                producer.finish();
                assert_eq!(producer.state(), EdgeState::Idle);
            },
            |vector| {
                let mut consumer = edge.consumer(vector);
                let mut sum = 0u32;
                for round in 0..ROUNDS {
                    consumer.wait();
                    let value: u32 = slots.read((round as usize % 2) * 4);
                    assert_eq!(value, round + 1, "stale slot read by {}", vector.core_id());
                    sum += value;
                    consumer.free();
                }
                sums.write(vector.index() as usize * 4, sum);
            },
        )
        .unwrap();

    let expected = (1..=ROUNDS).sum::<u32>();
    assert_eq!(sums.to_vec::<u32>(), vec![expected, expected]);
}

#[test]
fn vector_to_cube_waits_for_every_sub_engine() {
    let launcher = Launcher::with_properties(HardwareProperties::default()).unwrap();
    let edge = SyncEdge::<VectorToCube, ViaOnChip>::new(FlagId(2), FlagId(3));
    let shared = DeviceBuffer::on_chip(2 * 4);
    let seen = DeviceBuffer::zeros(4 * ROUNDS as usize);

    launcher
        .launch_mix(
            |cube| {
                let mut consumer = edge.consumer(cube);
                for round in 0..ROUNDS as usize {
                    consumer.wait();
                    let total = shared.read::<u32>(0) + shared.read::<u32>(4);
                    seen.write(round * 4, total);
                    consumer.free();
                }
            },
            |vector| {
                let mut producer = edge.producer(vector);
                let offset = vector.index() as usize * 4;
                for round in 0..ROUNDS {
                    producer.allocate();
                    shared.write(offset, (vector.index() as u32 + 1) * 10 + round);
                    producer.record();
                }
                producer.finish();
            },
        )
        .unwrap();

    let expected = (0..ROUNDS).map(|round| 30 + 2 * round).collect::<Vec<_>>();
    assert_eq!(seen.to_vec::<u32>(), expected);
}

#[test]
fn cube_record_raises_both_sub_engine_slots() {
    let props = HardwareProperties::default();
    let fabric = Arc::new(SyncFabric::new(&props));
    let cube = CubeEngine::new(props.clone(), fabric.clone(), InstructionTrace::default());
    let vector0 = VectorEngine::new(0, props.clone(), fabric.clone(), InstructionTrace::default());
    let vector1 = VectorEngine::new(1, props, fabric.clone(), InstructionTrace::default());

    let edge = SyncEdge::<CubeToVector, ViaGlobal>::new(FlagId(5), FlagId(6));
    let mut producer = edge.producer(&cube);
    let mut consumer0 = edge.consumer(&vector0);
    let mut consumer1 = edge.consumer(&vector1);

    assert!(!consumer0.try_wait());
    producer.allocate();
    producer.record();
    assert_eq!(fabric.pending(CoreId::Vector(0), CoreId::Cube, FlagId(5)), 1);
    assert_eq!(fabric.pending(CoreId::Vector(1), CoreId::Cube, FlagId(5)), 1);

    assert!(consumer0.try_wait());
    assert!(consumer1.try_wait());
    assert_eq!(consumer0.state(), EdgeState::ConsumerReading);

    consumer0.free();
    assert_eq!(fabric.pending(CoreId::Cube, CoreId::Vector(0), FlagId(6)), 1);
    assert_eq!(fabric.pending(CoreId::Cube, CoreId::Vector(1), FlagId(6)), 0);
}

#[test]
fn cube_consumer_needs_every_producer_for_try_wait() {
    let props = HardwareProperties::default();
    let fabric = Arc::new(SyncFabric::new(&props));
    let cube = CubeEngine::new(props.clone(), fabric.clone(), InstructionTrace::default());
    let vector0 = VectorEngine::new(0, props, fabric.clone(), InstructionTrace::default());

    let edge = SyncEdge::<VectorToCube, ViaGlobal>::new(FlagId(0), FlagId(1));
    let mut producer = edge.producer(&vector0);
    let mut consumer = edge.consumer(&cube);

    producer.allocate();
    producer.record();
    assert!(!consumer.try_wait());
    assert_eq!(consumer.state(), EdgeState::Idle);
    assert_eq!(fabric.pending(CoreId::Cube, CoreId::Vector(0), FlagId(0)), 1);
}

#[test]
#[should_panic(expected = "Edge depth 16 exceeds the flag depth of 15")]
fn edge_deeper_than_a_flag_is_rejected() {
    let cube = CubeEngine::detached(HardwareProperties::default());
    let edge = SyncEdge::<CubeToVector, ViaOnChip>::new(FlagId(0), FlagId(1)).with_depth(16);
    edge.producer(&cube);
}

#[test]
fn edge_as_deep_as_a_flag_never_blocks_the_producer() {
    let properties = HardwareProperties {
        flag_depth: 3,
        ..Default::default()
    };
    let fabric = Arc::new(SyncFabric::new(&properties));
    let cube = CubeEngine::new(properties, fabric.clone(), InstructionTrace::default());
    let edge = SyncEdge::<CubeToVector, ViaGlobal>::new(FlagId(0), FlagId(1)).with_depth(3);

    let mut producer = edge.producer(&cube);
    for _ in 0..3 {
        producer.allocate();
        producer.record();
    }
    assert_eq!(fabric.pending(CoreId::Vector(0), CoreId::Cube, FlagId(0)), 3);
    assert_eq!(fabric.pending(CoreId::Vector(1), CoreId::Cube, FlagId(0)), 3);
}

#[test]
fn pipe_selection_follows_transport() {
    assert_eq!(SyncEdge::<CubeToVector, ViaGlobal>::record_pipe(), Pipe::Fix);
    assert_eq!(SyncEdge::<CubeToVector, ViaGlobal>::wait_pipe(), Pipe::Mte2);
    assert_eq!(SyncEdge::<CubeToVector, ViaOnChip>::wait_pipe(), Pipe::V);
    assert_eq!(SyncEdge::<VectorToCube, ViaOnChip>::record_pipe(), Pipe::Mte3);
    assert_eq!(SyncEdge::<VectorToCube, ViaOnChip>::wait_pipe(), Pipe::M);
    assert_eq!(SyncEdge::<VectorToCube, ViaGlobal>::free_pipe(), Pipe::Mte2);
    assert_eq!(SyncEdge::<VectorToCube, ViaGlobal>::allocate_pipe(), Pipe::Mte3);
}

#[test]
fn aborted_producer_releases_blocked_consumer() {
    let launcher = Launcher::with_properties(HardwareProperties::default()).unwrap();
    let edge = SyncEdge::<VectorToCube, ViaGlobal>::new(FlagId(4), FlagId(7));

    let err = launcher
        .launch_mix(
            |cube| {
                let mut consumer = edge.consumer(cube);
                consumer.wait();
                consumer.free();
            },
            |vector| {
                let mut producer = edge.producer(vector);
                producer.allocate();
                assert!(vector.index() == 0, "valid rows mismatch on the second sub-engine");
                producer.record();
            },
        )
        .unwrap_err();

    match err {
        LaunchError::KernelAborted { core, message } => {
            assert_eq!(core, CoreId::Vector(1));
            assert!(message.contains("valid rows mismatch"));
        }
        other => panic!("unexpected error {other}"),
    }
}
