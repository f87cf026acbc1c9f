use super::*;
use std::rc::Rc;
use crate::error::Access;
use crate::renderer::mock_renderer::{EventLog, MockEvent, MockFenceProvider, MockRenderer};
use crate::renderer::{FenceProvider, FenceStatus, RendererConfig};
use crate::resource::{AttributeDescriptor, AttributeKind};

// ============================================================================
// Helpers
// ============================================================================

fn create_context() -> RenderContext {
    RenderContext::new(Box::new(MockRenderer::new()), RendererConfig::default())
}

/// Context plus handles on the mock fences and event log
fn create_scripted_context() -> (RenderContext, Rc<MockFenceProvider>, EventLog) {
    let renderer = MockRenderer::new();
    let fences = renderer.fences();
    let events = renderer.events();
    let ctx = RenderContext::new(Box::new(renderer), RendererConfig::default());
    (ctx, fences, events)
}

fn writes(events: &EventLog) -> Vec<MockEvent> {
    events
        .borrow()
        .iter()
        .filter(|e| matches!(e, MockEvent::Write { .. }))
        .copied()
        .collect()
}

// ============================================================================
// Allocation tests
// ============================================================================

#[test]
fn test_allocate_with_initial_data() {
    let mut ctx = create_context();
    let buffer = Buffer::allocate(&mut ctx, "init", Some(&[1u32, 2, 3, 4]), 16, BufferKind::ReadWriteTriple)
        .unwrap();

    assert_eq!(buffer.name(), "init");
    assert_eq!(buffer.size(), 16);
    assert_eq!(buffer.count(), 4);
    assert_eq!(buffer.capacity(), 4);
    assert_eq!(buffer.kind(), BufferKind::ReadWriteTriple);
    assert_eq!(buffer.slot_count(), 3);
    assert_eq!(buffer.active_slot_index(), 0);
}

#[test]
fn test_initial_data_replicated_into_every_slot() {
    let mut ctx = create_context();
    let mut buffer = Buffer::allocate(&mut ctx, "init", Some(&[7u16, 8]), 4, BufferKind::ReadWriteTriple)
        .unwrap();

    for _ in 0..3 {
        assert_eq!(buffer.read_all().unwrap(), vec![7, 8]);
        buffer.swap();
    }
}

#[test]
fn test_allocate_without_data_starts_empty() {
    let mut ctx = create_context();
    let buffer = ctx.allocate::<f32>("empty", None, 64, BufferKind::WriteOnly).unwrap();
    assert_eq!(buffer.count(), 0);
    assert_eq!(buffer.capacity(), 16);
}

#[test]
fn test_static_without_data_fails() {
    let mut ctx = create_context();
    let result = ctx.allocate::<f32>("static", None, 64, BufferKind::Static);
    assert!(matches!(result, Err(Error::MissingInitialData { .. })));
}

#[test]
fn test_zero_sized_element_rejected() {
    let mut ctx = create_context();
    let result = ctx.allocate::<()>("unit", None, 8, BufferKind::ReadWrite);
    assert!(matches!(result, Err(Error::InvalidResource(_))));
}

#[test]
fn test_allocate_with_usage() {
    let mut ctx = create_context();
    let buffer = Buffer::<u32>::allocate_with_usage(
        &mut ctx, "indices", BufferUsage::Index, Some(&[0, 1, 2]), 12, BufferKind::Static,
    )
    .unwrap();
    assert_eq!(buffer.handle().usage(), BufferUsage::Index);
    assert_eq!(buffer.count(), 3);
}

// ============================================================================
// Slot rotation tests
// ============================================================================

#[test]
fn test_swap_rotation_for_every_kind() {
    let mut ctx = create_context();
    for kind in BufferKind::ALL {
        let mut buffer = Buffer::allocate(&mut ctx, "rotate", Some(&[0u8; 4]), 4, kind).unwrap();
        let slots = kind.slot_count();

        for i in 0..(2 * slots + 1) {
            assert_eq!(buffer.active_slot_index(), i % slots, "{:?} after {} swaps", kind, i);
            buffer.swap();
        }
    }
}

#[test]
fn test_full_cycle_returns_to_start() {
    let mut ctx = create_context();
    let mut buffer = ctx.allocate::<f32>("cycle", None, 16, BufferKind::WriteOnlyTriple).unwrap();
    buffer.swap();
    let start = buffer.active_slot_index();
    for _ in 0..3 {
        buffer.swap();
    }
    assert_eq!(buffer.active_slot_index(), start);
}

// ============================================================================
// Format / capacity tests
// ============================================================================

#[test]
fn test_set_format_position_normal() {
    let mut ctx = create_context();
    let mut buffer = ctx.allocate::<f32>("mesh", None, 48, BufferKind::WriteOnly).unwrap();
    buffer.set_format(
        Layout::from_attributes([
            AttributeDescriptor::new(AttributeKind::Position3D, "position"),
            AttributeDescriptor::new(AttributeKind::Normal, "normal"),
        ])
        .unwrap(),
    );

    assert_eq!(buffer.layout().stride(), 24);
    assert_eq!(buffer.count(), 2);
}

#[test]
fn test_set_format_zero_stride() {
    let mut ctx = create_context();
    let mut buffer = Buffer::allocate(&mut ctx, "raw", Some(&[1u32; 8]), 32, BufferKind::ReadWrite).unwrap();
    assert_eq!(buffer.count(), 8);

    buffer.set_format(Layout::new());
    assert_eq!(buffer.layout().stride(), 0);
    assert_eq!(buffer.count(), 0);
}

#[test]
fn test_set_format_twice_same_result() {
    let mut ctx = create_context();
    let mut buffer = ctx.allocate::<f32>("twice", None, 96, BufferKind::WriteOnly).unwrap();
    let layout = Layout::from_attributes([
        AttributeDescriptor::new(AttributeKind::Position2D, "position"),
        AttributeDescriptor::new(AttributeKind::Color, "color"),
    ])
    .unwrap();

    buffer.set_format(layout.clone());
    buffer.set_format(layout);
    assert_eq!(buffer.layout().stride(), 24);
    assert_eq!(buffer.count(), 4);
}

// ============================================================================
// Read / write tests
// ============================================================================

#[test]
fn test_write_then_read_round_trip() {
    let mut ctx = create_context();
    let mut buffer = ctx.allocate::<f32>("rw", None, 16, BufferKind::ReadWrite).unwrap();

    buffer.write(2, 3.5).unwrap();
    assert_eq!(buffer.read(2).unwrap(), 3.5);
    assert_eq!(buffer.count(), 3);
}

#[test]
fn test_flush_grows_count() {
    let mut ctx = create_context();
    let mut buffer = ctx.allocate::<u32>("flush", None, 32, BufferKind::ReadWrite).unwrap();

    buffer.flush(&[1, 2, 3], 2).unwrap();
    assert_eq!(buffer.count(), 5);
    assert_eq!(buffer.read_all().unwrap(), vec![0, 0, 1, 2, 3]);

    // Rewriting the start does not shrink the count
    buffer.flush(&[9], 0).unwrap();
    assert_eq!(buffer.count(), 5);
    assert_eq!(buffer.read(0).unwrap(), 9);
}

#[test]
fn test_flush_overflow_rejected_without_mutation() {
    let mut ctx = create_context();
    let mut buffer = Buffer::allocate(&mut ctx, "small", Some(&[1u32, 2]), 8, BufferKind::ReadWrite).unwrap();

    let result = buffer.flush(&[5, 6], 1);
    assert!(matches!(result, Err(Error::CapacityExceeded { requested: 12, capacity: 8, .. })));
    assert_eq!(buffer.read_all().unwrap(), vec![1, 2]);
    assert_eq!(buffer.count(), 2);
}

#[test]
fn test_read_past_capacity_rejected() {
    let mut ctx = create_context();
    let buffer = ctx.allocate::<u32>("cap", None, 8, BufferKind::ReadWrite).unwrap();
    // Reads are checked against capacity, not count
    assert_eq!(buffer.read(1).unwrap(), 0);
    assert!(matches!(buffer.read(2), Err(Error::CapacityExceeded { .. })));
}

#[test]
fn test_huge_index_rejected() {
    let mut ctx = create_context();
    let mut buffer = Buffer::allocate(&mut ctx, "huge", Some(&[1.0f32, 2.0, 3.0, 4.0]), 16, BufferKind::ReadWrite)
        .unwrap();

    assert!(matches!(buffer.write(1 << 62, 9.0), Err(Error::CapacityExceeded { .. })));
    assert!(matches!(buffer.read(u64::MAX / 2), Err(Error::CapacityExceeded { .. })));
    assert!(matches!(buffer.flush(&[9.0, 9.0], u64::MAX - 1), Err(Error::CapacityExceeded { .. })));
    assert!(matches!(
        buffer.flush(&[], u64::MAX / 4),
        Err(Error::CapacityExceeded { capacity: 16, .. })
    ));

    // Nothing wrapped around into the valid range
    assert_eq!(buffer.read_all().unwrap(), vec![1.0, 2.0, 3.0, 4.0]);
    assert_eq!(buffer.count(), 4);
    buffer.clear(0.0).unwrap();
    assert_eq!(buffer.read_all().unwrap(), vec![0.0; 4]);
}

#[test]
fn test_clear_with_narrow_stride_stops_at_capacity() {
    let mut ctx = create_context();
    let mut buffer = ctx.allocate::<f32>("uniforms", None, 16, BufferKind::ReadWrite).unwrap();
    buffer.set_format(
        Layout::from_attributes([AttributeDescriptor::with_element_size(AttributeKind::Uniform, "flag", 1)])
            .unwrap(),
    );
    assert_eq!(buffer.count(), 16);
    assert_eq!(buffer.capacity(), 4);

    buffer.clear(2.5).unwrap();
    assert_eq!(buffer.read_all().unwrap(), vec![2.5; 4]);
}

#[test]
fn test_clear_fills_count_elements() {
    let mut ctx = create_context();
    let mut buffer = ctx.allocate::<u16>("clear", None, 16, BufferKind::ReadWrite).unwrap();

    buffer.flush(&[1, 2, 3], 0).unwrap();
    buffer.clear(0xABCD).unwrap();
    assert_eq!(buffer.read_all().unwrap(), vec![0xABCD; 3]);
    // Elements past count are untouched
    assert_eq!(buffer.read(3).unwrap(), 0);
}

#[test]
fn test_glam_vectors() {
    let mut ctx = create_context();
    let mut buffer = ctx.allocate::<glam::Vec3>("positions", None, 36, BufferKind::ReadWrite).unwrap();

    buffer.flush(&[glam::Vec3::X, glam::Vec3::Y], 0).unwrap();
    assert_eq!(buffer.read(1).unwrap(), glam::Vec3::Y);
    assert_eq!(buffer.capacity(), 3);
}

// ============================================================================
// Capability tests
// ============================================================================

#[test]
fn test_read_only_rejects_writes() {
    let mut ctx = create_context();
    let mut buffer = Buffer::allocate(&mut ctx, "ro", Some(&[4u32, 5]), 8, BufferKind::ReadOnly).unwrap();

    assert!(matches!(
        buffer.write(0, 1),
        Err(Error::CapabilityViolation { access: Access::Write, .. })
    ));
    assert!(buffer.flush(&[1], 0).is_err());
    assert!(buffer.clear(0).is_err());
    assert_eq!(buffer.read_all().unwrap(), vec![4, 5]);
}

#[test]
fn test_write_only_rejects_reads() {
    let mut ctx = create_context();
    let mut buffer = ctx.allocate::<u32>("wo", None, 8, BufferKind::WriteOnlyDouble).unwrap();

    buffer.write(0, 1).unwrap();
    assert!(matches!(
        buffer.read(0),
        Err(Error::CapabilityViolation { kind: BufferKind::WriteOnlyDouble, access: Access::Read, .. })
    ));
    assert!(buffer.read_all().is_err());
}

#[test]
fn test_static_rejects_cpu_access() {
    let (mut ctx, _fences, events) = create_scripted_context();
    let mut buffer = Buffer::allocate(&mut ctx, "static", Some(&[1u32, 2]), 8, BufferKind::Static).unwrap();

    assert!(matches!(buffer.read(0), Err(Error::CapabilityViolation { access: Access::Read, .. })));
    assert!(matches!(buffer.write(0, 3), Err(Error::CapabilityViolation { access: Access::Write, .. })));
    assert!(buffer.flush(&[3], 0).is_err());
    assert!(writes(&events).is_empty());
    assert_eq!(buffer.count(), 2);
}

// ============================================================================
// Multi-buffering tests
// ============================================================================

#[test]
fn test_double_buffer_isolation() {
    let mut ctx = create_context();
    let mut buffer = ctx.allocate::<u32>("double", None, 4, BufferKind::ReadWriteDouble).unwrap();

    buffer.write(0, 111).unwrap();
    buffer.swap();
    buffer.write(0, 222).unwrap();
    assert_eq!(buffer.read(0).unwrap(), 222);

    buffer.swap();
    assert_eq!(buffer.read(0).unwrap(), 111);
}

#[test]
fn test_write_only_double_frame_sequence() {
    let (mut ctx, fences, events) = create_scripted_context();
    let mut buffer = Buffer::allocate(&mut ctx, "quads", Some(&[1.0f32, 2.0, 3.0, 4.0]), 16, BufferKind::WriteOnlyDouble)
        .unwrap();
    let id = buffer.handle().id();

    // Slot 1 was read by an earlier draw and is still guarded
    fences.set_polls_before_signal(2);
    buffer.lock_slot(1).unwrap();
    let slot1_fence = buffer.handle().store().fence(1).unwrap();

    // Draw reading slot 0, then move to slot 1
    buffer.lock().unwrap();
    buffer.swap();
    assert_eq!(buffer.active_slot_index(), 1);

    events.borrow_mut().clear();
    buffer.flush(&[9.0, 9.0, 9.0, 9.0], 0).unwrap();

    // The slot 1 fence is waited on and released before the copy lands in slot 1
    assert_eq!(
        *events.borrow(),
        vec![
            MockEvent::Poll(slot1_fence, FenceStatus::TimeoutExpired),
            MockEvent::Poll(slot1_fence, FenceStatus::TimeoutExpired),
            MockEvent::Poll(slot1_fence, FenceStatus::Signaled),
            MockEvent::Release(slot1_fence),
            MockEvent::Write { buffer: id, offset: 16, len: 16 },
        ]
    );
    // Slot 0 keeps its fence and its contents
    assert_eq!(buffer.slot_state(0), SlotState::InFlight);
    assert_eq!(buffer.slot_state(1), SlotState::Idle);
    assert_eq!(buffer.count(), 4);
}

#[test]
fn test_wait_without_fence_is_immediate() {
    let (mut ctx, fences, events) = create_scripted_context();
    let mut buffer = ctx.allocate::<u8>("idle", None, 4, BufferKind::ReadWriteTriple).unwrap();

    buffer.wait().unwrap();
    assert_eq!(fences.poll_count(), 0);
    assert!(events.borrow().is_empty());
}

#[test]
fn test_drop_releases_fences() {
    let (mut ctx, fences, _events) = create_scripted_context();
    let mut buffer = ctx.allocate::<u8>("dropped", None, 4, BufferKind::WriteOnlyTriple).unwrap();
    for _ in 0..3 {
        buffer.lock().unwrap();
        buffer.swap();
    }
    assert_eq!(fences.in_flight(), 3);

    drop(buffer);
    assert_eq!(fences.in_flight(), 0);
}
