//! Skinning tests
//!
//! Tests for:
//! - Joint matrix computation (global * inverse bind)
//! - Joint budget enforcement at load time and per frame
//! - Skin validation against the scene graph
//! - Skinned and rigid nodes both following the animated pose

use std::f32::consts::FRAC_PI_2;

use glam::{Affine3A, Mat4, Quat, Vec3};
use myth_animation::animation::tracks::{InterpolationMode, KeyframeTrack};
use myth_animation::scene::skeleton::compute_joint_matrices;
use myth_animation::scene::transform_system::{HierarchyStack, update_hierarchy};
use myth_animation::{
    AnimatedModel, AnimationChannel, AnimationClip, AnimationError, AnimationSettings, DrawTransform,
    JointMatrixBuffer, MAX_JOINTS, Node, NodeId, NodeTransformTable, RepeatMode, SceneGraph, Skin,
    TargetPath, TrackData, Transform,
};

const EPSILON: f32 = 1e-5;

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// A flat graph of `n` root joints, each translated along X by its index.
fn joint_row(n: usize) -> SceneGraph {
    let mut builder = SceneGraph::builder();
    for i in 0..n {
        builder.add(Node::with_transform(Transform::from_translation(Vec3::X * i as f32)));
    }
    builder.build().unwrap()
}

fn evaluated_pose(graph: &SceneGraph) -> NodeTransformTable {
    let mut table = NodeTransformTable::new(graph);
    update_hierarchy(graph, &mut table, &mut HierarchyStack::new());
    table
}

// ============================================================================
// Joint matrices
// ============================================================================

#[test]
fn joint_at_bind_pose_is_identity() {
    // One joint placed at (0, 2, 0); its inverse bind matrix undoes exactly that.
    let mut builder = SceneGraph::builder();
    let joint = builder.add(Node::with_transform(Transform::from_translation(Vec3::Y * 2.0)));
    let graph = builder.build().unwrap();

    let skin = Skin::with_inverse_bind_matrices(
        "bind",
        vec![joint],
        vec![Affine3A::from_translation(Vec3::Y * -2.0)],
    );
    let pose = evaluated_pose(&graph);
    let mut buffer = JointMatrixBuffer::with_capacity(MAX_JOINTS);

    compute_joint_matrices(&skin, &pose, &mut buffer).unwrap();

    assert_eq!(buffer.len(), 1);
    assert!(buffer.as_slice()[0].abs_diff_eq(Mat4::IDENTITY, EPSILON));
}

#[test]
fn joint_matrix_is_global_times_inverse_bind() {
    let mut builder = SceneGraph::builder();
    let root = builder.add(Node::with_transform(
        Transform::from_translation(Vec3::Z).with_rotation(Quat::from_rotation_y(FRAC_PI_2)),
    ));
    let tip = builder.add(Node::with_transform(Transform::from_translation(Vec3::X)));
    builder.attach(root, tip);
    let graph = builder.build().unwrap();

    let ibm = Affine3A::from_scale_rotation_translation(
        Vec3::ONE,
        Quat::from_rotation_x(0.4),
        Vec3::new(0.0, -1.0, 0.5),
    );
    let skin = Skin::with_inverse_bind_matrices("s", vec![tip, root], vec![ibm, Affine3A::IDENTITY]);

    let pose = evaluated_pose(&graph);
    let mut buffer = JointMatrixBuffer::with_capacity(4);
    compute_joint_matrices(&skin, &pose, &mut buffer).unwrap();

    let expected_tip = Mat4::from(*pose.global(tip).unwrap() * ibm);
    let expected_root = pose.global_matrix(root).unwrap();
    assert!(buffer.as_slice()[0].abs_diff_eq(expected_tip, EPSILON));
    assert!(buffer.as_slice()[1].abs_diff_eq(expected_root, EPSILON));

    // Unused slots stay identity.
    assert_eq!(buffer.as_padded().len(), 4);
    assert_eq!(buffer.as_padded()[2], Mat4::IDENTITY);
    assert_eq!(buffer.as_padded()[3], Mat4::IDENTITY);
}

#[test]
fn smaller_skin_resets_released_slots() {
    let graph = joint_row(3);
    let pose = evaluated_pose(&graph);
    let mut buffer = JointMatrixBuffer::with_capacity(3);

    let big = Skin::new("big", vec![NodeId(0), NodeId(1), NodeId(2)]);
    compute_joint_matrices(&big, &pose, &mut buffer).unwrap();
    assert_ne!(buffer.as_padded()[2], Mat4::IDENTITY);

    let small = Skin::new("small", vec![NodeId(1)]);
    compute_joint_matrices(&small, &pose, &mut buffer).unwrap();
    assert_eq!(buffer.len(), 1);
    assert_eq!(buffer.as_padded()[1], Mat4::IDENTITY);
    assert_eq!(buffer.as_padded()[2], Mat4::IDENTITY);
}

#[test]
fn oversized_skin_fails_without_truncating() {
    let graph = joint_row(5);
    let pose = evaluated_pose(&graph);
    let mut buffer = JointMatrixBuffer::with_capacity(4);

    let skin = Skin::new("five", (0..5).map(NodeId).collect());
    let result = compute_joint_matrices(&skin, &pose, &mut buffer);

    assert_eq!(
        result,
        Err(AnimationError::JointBudgetExceeded {
            skin: "five".to_string(),
            joints: 5,
            budget: 4,
        })
    );
    assert!(buffer.is_empty());
}

// ============================================================================
// Load-time validation
// ============================================================================

#[test]
fn skin_over_budget_rejects_model() {
    init_logger();

    let graph = joint_row(3);
    let skin = Skin::new("three", vec![NodeId(0), NodeId(1), NodeId(2)]);
    let settings = AnimationSettings::default().with_joint_budget(2);

    let result = AnimatedModel::new(graph, vec![], vec![skin], settings);
    assert!(matches!(
        result,
        Err(AnimationError::JointBudgetExceeded { joints: 3, budget: 2, .. })
    ));
}

#[test]
fn default_budget_is_max_joints() {
    let graph = joint_row(MAX_JOINTS + 1);
    let skin = Skin::new("too_many", (0..=MAX_JOINTS).map(NodeId).collect());

    let result = AnimatedModel::new(graph, vec![], vec![skin], AnimationSettings::default());
    assert!(matches!(
        result,
        Err(AnimationError::JointBudgetExceeded { joints: 101, budget: 100, .. })
    ));
}

#[test]
fn skin_at_budget_is_accepted() {
    let graph = joint_row(MAX_JOINTS);
    let skin = Skin::new("full", (0..MAX_JOINTS).map(NodeId).collect());

    let model = AnimatedModel::new(graph, vec![], vec![skin], AnimationSettings::default()).unwrap();
    let joints = model.joint_matrices(0).unwrap();
    assert_eq!(joints.len(), MAX_JOINTS);
    // Identity IBMs: each joint matrix is the joint's world transform.
    assert!(joints.as_slice()[7].abs_diff_eq(Mat4::from_translation(Vec3::X * 7.0), EPSILON));
}

#[test]
fn mismatched_inverse_bind_count_is_invalid() {
    let graph = joint_row(2);
    let skin = Skin::with_inverse_bind_matrices("s", vec![NodeId(0), NodeId(1)], vec![Affine3A::IDENTITY]);

    assert!(matches!(
        AnimatedModel::new(graph, vec![], vec![skin], AnimationSettings::default()),
        Err(AnimationError::InvalidSkin { .. })
    ));
}

#[test]
fn joint_outside_graph_is_invalid() {
    let graph = joint_row(2);
    let skin = Skin::new("s", vec![NodeId(0), NodeId(9)]);

    assert!(matches!(
        AnimatedModel::new(graph, vec![], vec![skin], AnimationSettings::default()),
        Err(AnimationError::InvalidSkin { .. })
    ));
}

#[test]
fn node_referencing_missing_skin_is_invalid() {
    let mut builder = SceneGraph::builder();
    builder.add(Node::new().with_skin(3));
    let graph = builder.build().unwrap();

    assert!(matches!(
        AnimatedModel::new(graph, vec![], vec![], AnimationSettings::default()),
        Err(AnimationError::InvalidSkin { .. })
    ));
}

// ============================================================================
// Skinned and rigid nodes share the animated pose
// ============================================================================

#[test]
fn skinned_and_rigid_nodes_follow_animation() -> anyhow::Result<()> {
    init_logger();

    let mut builder = SceneGraph::builder();
    let root = builder.add(Node::new().named("root"));
    let joint = builder.add(Node::new().named("joint"));
    let mesh = builder.add(Node::new().named("skinned_mesh").with_skin(0));
    let prop = builder.add(Node::new().named("rigid_prop"));
    builder.attach(root, joint).attach(root, mesh).attach(joint, prop);
    let graph = builder.build()?;

    let track = KeyframeTrack::new(
        vec![0.0, 1.0],
        vec![Vec3::ZERO, Vec3::new(0.0, 4.0, 0.0)],
        InterpolationMode::Linear,
    )?;
    let clip = AnimationClip::new(
        "raise",
        vec![AnimationChannel::new(joint, TargetPath::Translation, TrackData::Vector3(track))],
    )?;

    let skin = Skin::new("arm", vec![joint]).bound_to(0);
    let mut model = AnimatedModel::new(graph, vec![clip], vec![skin], AnimationSettings::default())?;
    model.play_by_name("raise", RepeatMode::Once)?;
    model.update(0.5);

    let expected = Mat4::from_translation(Vec3::new(0.0, 2.0, 0.0));

    match model.draw_transform(mesh) {
        Some(DrawTransform::Skinned { skin, joints }) => {
            assert_eq!(skin, 0);
            assert!(joints[0].abs_diff_eq(expected, EPSILON));
        }
        other => panic!("expected skinned draw transform, got {other:?}"),
    }

    match model.draw_transform(prop) {
        Some(DrawTransform::Rigid(matrix)) => assert!(matrix.abs_diff_eq(expected, EPSILON)),
        other => panic!("expected rigid draw transform, got {other:?}"),
    }

    assert!(model.draw_transform(NodeId(42)).is_none());
    Ok(())
}
