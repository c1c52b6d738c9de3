//! Writing trial files and reading them back

use trialgen_core::{
    CameraMatrices, ClothActor, CollisionEvent, ContactPoint, DatasetFlavor,
    FlexActor, FlexContainer, FlexStatic, Frame, ImagePass, Mat4, ObjectId, ObjectObservation,
    ParticleObservation, Quat, RigidStatic, TrialStatic, Vec3,
};
use trialgen_output::{DatasetReader, DatasetWriter, Dtype, WriterError};

fn observation(id: i32, y: f32) -> ObjectObservation {
    let mut o =
        ObjectObservation::transform(ObjectId(id), Vec3::new(1.0, y, 0.0), Quat::IDENTITY, Vec3::Z);
    o.velocity = Some(Vec3::new(0.0, -1.0, 0.0));
    o.angular_velocity = Some(Vec3::ZERO);
    o.sleeping = Some(false);
    o
}

fn rigid_static(ids: &[i32]) -> TrialStatic {
    TrialStatic {
        flavor: DatasetFlavor::Rigidbodies,
        object_ids: ids.iter().map(|&i| ObjectId(i)).collect(),
        rigid: Some(RigidStatic {
            mass: vec![1.0; ids.len()],
            static_friction: vec![0.5; ids.len()],
            dynamic_friction: vec![0.4; ids.len()],
            bounciness: vec![0.3; ids.len()],
        }),
        flex: None,
    }
}

fn rigid_frame(index: u32) -> Frame {
    Frame {
        index,
        objects: vec![observation(1, 0.5), observation(2, -3.0)],
        collisions: vec![CollisionEvent {
            collider: ObjectId(1),
            collidee: ObjectId(2),
            relative_velocity: Vec3::new(0.0, 2.0, 0.0),
            contacts: vec![
                ContactPoint { normal: Vec3::Y, point: Vec3::ZERO },
                ContactPoint { normal: Vec3::Y, point: Vec3::X },
            ],
        }],
        env_collisions: vec![],
        camera: Some(CameraMatrices {
            projection: Mat4::IDENTITY,
            camera: Mat4::IDENTITY,
        }),
        images: vec![ImagePass {
            pass_mask: "_img".to_string(),
            width: 4,
            height: 4,
            data: vec![7; 10],
        }],
        particles: vec![],
    }
}

#[test]
fn test_rigid_trial_layout() {
    let dir = tempfile::tempdir().unwrap();
    let temp = dir.path().join("temp.zip");
    let final_path = dir.path().join("0000.zip");

    let mut writer = DatasetWriter::open(&temp, DatasetFlavor::Rigidbodies).unwrap();
    for i in 0..3 {
        writer.append_frame(&rigid_frame(i)).unwrap();
    }
    writer.write_static(&rigid_static(&[1, 2])).unwrap();
    let published = writer.finalize(&final_path).unwrap();

    assert_eq!(published, final_path);
    assert!(!temp.exists());

    let mut reader = DatasetReader::open(&final_path).unwrap();
    assert_eq!(reader.frame_names(), ["0000", "0001", "0002"]);
    assert!(reader.has_group("static"));

    let ids = reader.read_array("static/object_ids").unwrap();
    assert_eq!(ids.dtype, Dtype::I32);
    assert_eq!(ids.to_i32().unwrap(), [1, 2]);
    assert_eq!(reader.read_array("static/bounciness").unwrap().shape, [2]);

    let positions = reader.read_array("frames/0001/objects/positions").unwrap();
    assert_eq!(positions.shape, [2, 3]);
    assert_eq!(positions.to_f32().unwrap()[4], -3.0);
    assert_eq!(reader.read_array("frames/0001/objects/rotations").unwrap().shape, [2, 4]);
    assert_eq!(reader.read_array("frames/0001/objects/velocities").unwrap().shape, [2, 3]);

    assert_eq!(reader.read_array("frames/0002/collisions/object_ids").unwrap().shape, [1, 2]);
    assert_eq!(reader.read_array("frames/0002/collisions/contacts").unwrap().shape, [2, 2, 3]);
    assert_eq!(reader.read_array("frames/0002/env_collisions/object_ids").unwrap().shape, [0]);
    assert!(reader.has_group("frames/0002/env_collisions"));

    let image = reader.read_array("frames/0000/images/_img").unwrap();
    assert_eq!(image.dtype, Dtype::U8);
    assert_eq!(image.data, vec![7; 10]);
    let projection = reader
        .read_array("frames/0000/camera_matrices/projection_matrix")
        .unwrap();
    assert_eq!(projection.shape, [16]);
}

#[test]
fn test_transforms_flavor_omits_velocities() {
    let dir = tempfile::tempdir().unwrap();
    let temp = dir.path().join("temp.zip");
    let mut writer = DatasetWriter::open(&temp, DatasetFlavor::Transforms).unwrap();
    writer
        .write_static(&TrialStatic {
            flavor: DatasetFlavor::Transforms,
            object_ids: vec![ObjectId(1), ObjectId(2)],
            rigid: None,
            flex: None,
        })
        .unwrap();
    writer.append_frame(&rigid_frame(0)).unwrap();
    let path = writer.finalize(dir.path().join("0000.zip")).unwrap();

    let mut reader = DatasetReader::open(path).unwrap();
    assert!(reader.read_array("frames/0000/objects/velocities").is_err());
    assert!(reader.read_array("static/mass").is_err());
    assert!(reader.read_array("frames/0000/objects/forwards").is_ok());
}

#[test]
fn test_flex_trial_layout() {
    let dir = tempfile::tempdir().unwrap();
    let temp = dir.path().join("temp.zip");
    let mut writer = DatasetWriter::open(&temp, DatasetFlavor::Flex).unwrap();
    writer
        .write_static(&TrialStatic {
            flavor: DatasetFlavor::Flex,
            object_ids: vec![ObjectId(10), ObjectId(11)],
            rigid: None,
            flex: Some(FlexStatic {
                container: Some(FlexContainer::default()),
                actors: vec![(ObjectId(11), FlexActor::Cloth(ClothActor::default()))],
            }),
        })
        .unwrap();
    writer
        .append_frame(&Frame {
            index: 0,
            objects: vec![observation(10, 0.0), observation(11, 1.0)],
            particles: vec![ParticleObservation {
                id: ObjectId(11),
                particles: vec![[0.0, 1.0, 0.0, 1.0]; 5],
                velocities: vec![Vec3::ZERO; 5],
            }],
            ..Default::default()
        })
        .unwrap();
    let path = writer.finalize(dir.path().join("0000.zip")).unwrap();

    let mut reader = DatasetReader::open(path).unwrap();
    assert_eq!(reader.read_array("frames/0000/particles/11").unwrap().shape, [5, 4]);
    assert_eq!(reader.read_array("frames/0000/velocities/11").unwrap().shape, [5, 3]);
    assert_eq!(reader.read_array("static/cloth_actors/object_id").unwrap().to_i32().unwrap(), [11]);
    assert_eq!(reader.read_array("static/cloth_actors/mass_scale").unwrap().shape, [1]);
    assert!(reader.has_group("static/solid_actors"));
    let substeps = reader.read_array("static/container/substep_count").unwrap();
    assert_eq!(substeps.to_f32().unwrap(), [3.0]);
}

#[test]
fn test_static_written_once() {
    let dir = tempfile::tempdir().unwrap();
    let mut writer =
        DatasetWriter::open(dir.path().join("temp.zip"), DatasetFlavor::Rigidbodies).unwrap();
    writer.write_static(&rigid_static(&[1])).unwrap();
    let err = writer.write_static(&rigid_static(&[1])).unwrap_err();
    assert!(matches!(err, WriterError::StaticAlreadyWritten));
}

#[test]
fn test_frames_must_be_contiguous() {
    let dir = tempfile::tempdir().unwrap();
    let mut writer =
        DatasetWriter::open(dir.path().join("temp.zip"), DatasetFlavor::Rigidbodies).unwrap();
    writer.append_frame(&rigid_frame(0)).unwrap();
    let err = writer.append_frame(&rigid_frame(2)).unwrap_err();
    assert!(matches!(err, WriterError::FrameOutOfOrder { expected: 1, got: 2 }));
    assert_eq!(writer.frame_count(), 1);
}

#[test]
fn test_finalize_requires_static() {
    let dir = tempfile::tempdir().unwrap();
    let final_path = dir.path().join("0000.zip");
    let mut writer =
        DatasetWriter::open(dir.path().join("temp.zip"), DatasetFlavor::Rigidbodies).unwrap();
    writer.append_frame(&rigid_frame(0)).unwrap();
    assert!(matches!(writer.finalize(&final_path), Err(WriterError::MissingStatic)));
    assert!(!final_path.exists());
}

#[test]
fn test_abandon_removes_temp() {
    let dir = tempfile::tempdir().unwrap();
    let temp = dir.path().join("temp.zip");
    let mut writer = DatasetWriter::open(&temp, DatasetFlavor::Rigidbodies).unwrap();
    writer.append_frame(&rigid_frame(0)).unwrap();
    assert!(temp.exists());
    writer.abandon().unwrap();
    assert!(!temp.exists());
}
