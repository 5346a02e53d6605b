use half::{bf16, f16};
use pretty_assertions::assert_eq;
use rand::{rngs::StdRng, Rng, SeedableRng};
use tilecl_common::{Element, PadValue};
use tilecl_core::{
    fill,
    layout::{global, ColMajor, Dn, Nd, Nz, RowMajor, Zn, Zz},
    load,
    space::{Matrix, Vector},
    store, GlobalView, Tile, TransferPair,
};
use tilecl_runtime::{
    config::HardwareProperties, CubeEngine, DeviceBuffer, Engine, Instruction, VectorEngine,
};

fn random<E: Element>(len: usize, seed: u64) -> Vec<E> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..len)
        .map(|_| E::from_f64(rng.gen_range(0..100) as f64))
        .collect()
}

fn vector_engine() -> VectorEngine {
    VectorEngine::detached(HardwareProperties::default())
}

fn cube_engine() -> CubeEngine {
    CubeEngine::detached(HardwareProperties::default())
}

#[test]
fn row_major_round_trip_excludes_padding() {
    let mut engine = vector_engine();
    let values = random::<f32>(5 * 6, 1);
    let src = GlobalView::<f32, Nd>::matrix(DeviceBuffer::from_slice(&values), 5, 6).unwrap();
    let dst = GlobalView::<f32, Nd>::matrix(DeviceBuffer::zeros(8 * 8 * 4), 8, 8).unwrap();

    let tile = Tile::<Vector, f32, 8, 8, RowMajor>::bind(&engine, 0)
        .unwrap()
        .with_valid(5, 6)
        .with_pad(PadValue::Max);
    load(&mut engine, &tile, &src);

    assert_eq!(tile.to_vec(&engine), values);
    assert_eq!(tile.read(&engine, 0, 6), f32::INFINITY);
    assert_eq!(tile.read(&engine, 7, 0), f32::INFINITY);
    assert_eq!(engine.trace().count(Instruction::LineCopy), 5);
    assert_eq!(engine.trace().count(Instruction::VDup), 1);

    store(&mut engine, &dst, &tile);
    let stored = dst.to_vec(8, 8);
    for row in 0..8 {
        for col in 0..8 {
            let expected = if row < 5 && col < 6 {
                values[row * 6 + col]
            } else {
                0.0
            };
            assert_eq!(stored[row * 8 + col], expected, "cell ({row}, {col})");
        }
    }
}

#[test]
fn nd_to_col_major_swaps_the_contiguous_dimension() {
    let mut engine = vector_engine();
    let values = random::<f32>(8 * 16, 2);
    let src = GlobalView::<f32, Nd>::matrix(DeviceBuffer::from_slice(&values), 8, 16).unwrap();
    let dst = GlobalView::<f32, Nd>::matrix(DeviceBuffer::zeros(8 * 16 * 4), 8, 16).unwrap();
    let tile = Tile::<Vector, f32, 8, 16, ColMajor>::bind(&engine, 1024).unwrap();

    load(&mut engine, &tile, &src);
    let area = engine.area(tilecl_runtime::SpaceKind::Vector);
    assert_eq!(area.read::<f32>(1024 + 4), values[16]);
    assert_eq!(engine.trace().count(Instruction::ElementCopy), 8);

    store(&mut engine, &dst, &tile);
    assert_eq!(dst.buffer().to_vec::<f32>(), values);
}

#[test]
fn dn_to_col_major_copies_columns() {
    let mut engine = vector_engine();
    let values = random::<i16>(16 * 6, 3);
    let src = GlobalView::<i16, Dn>::matrix(DeviceBuffer::from_slice(&values), 16, 6).unwrap();
    let tile = Tile::<Vector, i16, 16, 6, ColMajor>::bind(&engine, 0).unwrap();

    load(&mut engine, &tile, &src);
    assert_eq!(tile.read(&engine, 3, 2), values[2 * 16 + 3]);
    assert_eq!(engine.trace().count(Instruction::LineCopy), 6);

    let dst = GlobalView::<i16, Dn>::matrix(DeviceBuffer::zeros(16 * 6 * 2), 16, 6).unwrap();
    store(&mut engine, &dst, &tile);
    assert_eq!(dst.buffer().to_vec::<i16>(), values);
}

fn fractal_round_trip<E, const ROWS: usize, const COLS: usize, L>(seed: u64)
where
    E: Element,
    L: TransferPair<Nd>,
{
    let mut engine = cube_engine();
    let values = random::<E>(49 * 35, seed);
    let src = GlobalView::<E, Nd>::matrix(DeviceBuffer::from_slice(&values), 49, 35).unwrap();
    let dst = GlobalView::<E, Nd>::matrix(DeviceBuffer::zeros(49 * 35 * E::SIZE), 49, 35).unwrap();

    let stale = Tile::<Matrix, E, ROWS, COLS, L>::bind(&engine, 512).unwrap();
    fill(&mut engine, &stale, E::from_f64(9.0));
    let tile = stale.with_valid(49, 35).with_pad(PadValue::Zero);

    load(&mut engine, &tile, &src);
    for col in 35..COLS {
        assert_eq!(tile.read(&engine, 0, col), E::from_bits(0));
    }
    for row in 49..ROWS {
        assert_eq!(tile.read(&engine, row, 34), E::from_bits(0));
    }
    assert_eq!(tile.to_vec(&engine), values);

    store(&mut engine, &dst, &tile);
    assert_eq!(dst.buffer().to_vec::<E>(), values);
}

#[test]
fn fractal_round_trip_nz() {
    fractal_round_trip::<f16, 64, 48, Nz>(4);
    fractal_round_trip::<f32, 64, 40, Nz>(5);
    fractal_round_trip::<i8, 64, 64, Nz>(6);
}

#[test]
fn fractal_round_trip_zn() {
    fractal_round_trip::<f32, 56, 48, Zn>(7);
    fractal_round_trip::<bf16, 64, 48, Zn>(8);
}

#[test]
fn fractal_round_trip_zz() {
    fractal_round_trip::<f16, 64, 48, Zz>(9);
    fractal_round_trip::<u8, 64, 64, Zz>(10);
}

#[test]
#[should_panic(expected = "unit outer dimensions")]
fn fractal_conversion_needs_a_2d_view() {
    let mut engine = cube_engine();
    let src = GlobalView::<f16, Nd>::contiguous(DeviceBuffer::zeros(2 * 16 * 16 * 2), [1, 1, 2, 16, 16])
        .unwrap();
    let tile = Tile::<Matrix, f16, 32, 16, Nz>::bind(&engine, 0).unwrap();
    load(&mut engine, &tile, &src);
}

#[test]
fn fractal_block_copy_keeps_boxes() {
    let mut engine = cube_engine();
    let values = random::<f32>(32 * 16, 11);
    let src = GlobalView::<f32, global::Nz>::matrix(DeviceBuffer::from_slice(&values), 32, 16).unwrap();
    let tile = Tile::<Matrix, f32, 32, 16, Nz>::bind(&engine, 0).unwrap();

    load(&mut engine, &tile, &src);
    assert_eq!(engine.trace().count(Instruction::BlockCopy), 2);
    for row in 0..32 {
        for col in 0..16 {
            assert_eq!(tile.read(&engine, row, col), src.read(row, col));
        }
    }

    let dst = GlobalView::<f32, global::Nz>::matrix(DeviceBuffer::zeros(32 * 16 * 4), 32, 16).unwrap();
    let partial = tile.with_valid(20, 12);
    store(&mut engine, &dst, &partial);
    for row in 0..32 {
        for col in 0..16 {
            let expected = if row < 20 && col < 12 {
                src.read(row, col)
            } else {
                0.0
            };
            assert_eq!(dst.read(row, col), expected);
        }
    }
}

#[test]
fn zn_block_copy_keeps_column_boxes() {
    let mut engine = cube_engine();
    let values = random::<f32>(16 * 32, 15);
    let src = GlobalView::<f32, global::Zn>::matrix(DeviceBuffer::from_slice(&values), 16, 32).unwrap();
    let tile = Tile::<Matrix, f32, 16, 32, Zn>::bind(&engine, 0).unwrap();

    load(&mut engine, &tile, &src);
    // C0 = 8 for f32: one block copy per row of boxes, and the raw boxes match.
    assert_eq!(engine.trace().count(Instruction::BlockCopy), 2);
    let staged = engine.area(tile.space()).bytes()[..16 * 32 * 4].to_vec();
    assert_eq!(staged, src.buffer().with_bytes(|bytes| bytes.to_vec()));

    let dst = GlobalView::<f32, global::Zn>::matrix(DeviceBuffer::zeros(16 * 32 * 4), 16, 32).unwrap();
    engine.trace_mut().reset();
    store(&mut engine, &dst, &tile.with_valid(11, 20));
    assert_eq!(engine.trace().count(Instruction::BlockCopy), 2);
    for row in 0..16 {
        for col in 0..32 {
            let expected = if row < 11 && col < 20 {
                src.read(row, col)
            } else {
                0.0
            };
            assert_eq!(dst.read(row, col), expected, "cell ({row}, {col})");
        }
    }
}

#[test]
fn stacked_outer_dims_store_one_burst_per_run() {
    let mut engine = vector_engine();
    let values = random::<f32>(12 * 8, 12);
    let tile = Tile::<Vector, f32, 16, 8, RowMajor>::bind(&engine, 0)
        .unwrap()
        .with_valid(12, 8);
    tile.write_slice(&mut engine, &values);

    // Dimension 2 is padded to 40 elements, so rows are evenly spaced by groups of 4.
    let dst = GlobalView::<f32, Nd>::new(
        DeviceBuffer::zeros(128 * 4),
        0,
        [1, 1, 3, 4, 8],
        [128, 128, 40, 8, 1],
    )
    .unwrap();
    store(&mut engine, &dst, &tile);

    assert_eq!(engine.trace().count(Instruction::BurstCopy), 3);
    assert_eq!(dst.to_vec(12, 8), values);
    assert_eq!(dst.buffer().read::<f32>(32 * 4), 0.0);
}

#[test]
fn unit_dimension_with_padded_stride_keeps_the_gap() {
    let mut engine = vector_engine();
    let values = (1..=64).map(|value| value as f32).collect::<Vec<_>>();
    let tile = Tile::<Vector, f32, 8, 8, RowMajor>::bind(&engine, 0).unwrap();
    tile.write_slice(&mut engine, &values);

    // Dimension 2 has a single element, the two groups of 4 rows are 40 elements apart.
    let dst = GlobalView::<f32, Nd>::new(
        DeviceBuffer::zeros(80 * 4),
        0,
        [1, 2, 1, 4, 8],
        [80, 40, 40, 8, 1],
    )
    .unwrap();
    store(&mut engine, &dst, &tile);

    assert_eq!(engine.trace().count(Instruction::BurstCopy), 2);
    assert_eq!(dst.to_vec(8, 8), values);

    let stored = dst.buffer().to_vec::<f32>();
    assert_eq!(stored[..32].to_vec(), values[..32].to_vec());
    assert_eq!(stored[32..40].to_vec(), vec![0.0f32; 8]);
    assert_eq!(stored[40..72].to_vec(), values[32..].to_vec());
    assert_eq!(stored[72..].to_vec(), vec![0.0f32; 8]);
}

#[test]
fn packed_store_is_a_single_burst() {
    let mut engine = vector_engine();
    let values = random::<f32>(128 * 64, 13);
    let src = GlobalView::<f32, Nd>::matrix(DeviceBuffer::from_slice(&values), 128, 64).unwrap();
    let dst = GlobalView::<f32, Nd>::matrix(DeviceBuffer::zeros(128 * 64 * 4), 128, 64).unwrap();
    let tile = Tile::<Vector, f32, 128, 64, RowMajor>::bind(&engine, 0).unwrap();

    load(&mut engine, &tile, &src);
    engine.trace_mut().reset();
    store(&mut engine, &dst, &tile);

    assert_eq!(engine.trace().count(Instruction::BurstCopy), 1);
    assert_eq!(engine.trace().count(Instruction::LineCopy), 0);
    assert_eq!(dst.buffer().to_vec::<f32>(), values);
}

#[test_log::test]
fn overflowing_descriptor_falls_back_to_rows() {
    let properties = HardwareProperties {
        burst_count_bits: 2,
        ..Default::default()
    };
    let mut engine = VectorEngine::detached(properties);
    let values = random::<u32>(8 * 8, 14);
    let tile = Tile::<Vector, u32, 8, 8, RowMajor>::bind(&engine, 0).unwrap();
    tile.write_slice(&mut engine, &values);
    let dst = GlobalView::<u32, Nd>::matrix(DeviceBuffer::zeros(8 * 8 * 4), 8, 8).unwrap();

    store(&mut engine, &dst, &tile);
    assert_eq!(engine.trace().count(Instruction::BurstCopy), 0);
    assert_eq!(engine.trace().count(Instruction::LineCopy), 8);
    assert_eq!(dst.buffer().to_vec::<u32>(), values);

    engine.trace_mut().reset();
    store(&mut engine, &dst, &tile.with_valid(3, 8));
    assert_eq!(engine.trace().count(Instruction::BurstCopy), 1);
}

#[test]
fn empty_valid_region_is_a_no_op() {
    let mut engine = vector_engine();
    let full = Tile::<Vector, f32, 8, 8, RowMajor>::bind(&engine, 0).unwrap();
    fill(&mut engine, &full, 5.0);
    engine.trace_mut().reset();

    let src = GlobalView::<f32, Nd>::matrix(DeviceBuffer::from_slice(&[1.0f32; 64]), 8, 8).unwrap();
    let empty = full.with_valid(0, 8).with_pad(PadValue::Zero);
    load(&mut engine, &empty, &src);
    assert_eq!(full.to_vec(&engine), vec![5.0; 64]);

    let dst = GlobalView::<f32, Nd>::matrix(DeviceBuffer::zeros(64 * 4), 8, 8).unwrap();
    store(&mut engine, &dst, &full.with_valid(8, 0));
    assert_eq!(dst.buffer().to_vec::<f32>(), vec![0.0; 64]);
    assert_eq!(engine.trace().total(), 0);
}

#[test]
#[should_panic(expected = "exceeds the 4x8 view")]
fn view_must_cover_the_valid_region() {
    let mut engine = vector_engine();
    let src = GlobalView::<f32, Nd>::matrix(DeviceBuffer::zeros(32 * 4), 4, 8).unwrap();
    let tile = Tile::<Vector, f32, 8, 8, RowMajor>::bind(&engine, 0).unwrap();
    load(&mut engine, &tile, &src);
}

fn padded_cell<E: Element, const COLS: usize>(pad: PadValue) -> E {
    let mut engine = vector_engine();
    let full = Tile::<Vector, E, 2, COLS, RowMajor>::bind(&engine, 0).unwrap();
    fill(&mut engine, &full, E::from_f64(5.0));

    let src = GlobalView::<E, Nd>::matrix(DeviceBuffer::zeros(2 * COLS * E::SIZE), 2, COLS).unwrap();
    let tile = full.with_valid(2, COLS - 1).with_pad(pad);
    load(&mut engine, &tile, &src);
    tile.read(&engine, 1, COLS - 1)
}

#[test]
fn padding_bit_patterns() {
    assert_eq!(padded_cell::<u8, 32>(PadValue::Max), 0xFF);
    assert_eq!(padded_cell::<u8, 32>(PadValue::Zero), 0);
    assert_eq!(padded_cell::<i32, 8>(PadValue::Min), i32::MIN);
    assert_eq!(padded_cell::<i16, 16>(PadValue::Max), i16::MAX);
    assert_eq!(padded_cell::<f16, 16>(PadValue::Min), f16::NEG_INFINITY);
    assert_eq!(padded_cell::<bf16, 16>(PadValue::Max), bf16::INFINITY);
    assert_eq!(padded_cell::<f32, 8>(PadValue::Max), f32::INFINITY);
    // Unsigned minimum collapses to zero.
    assert_eq!(padded_cell::<u16, 16>(PadValue::Min), 0);
    // Null leaves the stale value.
    assert_eq!(padded_cell::<u32, 8>(PadValue::Null), 5);
}
