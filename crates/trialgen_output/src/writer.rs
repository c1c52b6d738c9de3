//! Trial file writer
//!
//! A trial file is a zip archive. Groups are directory entries and every
//! dataset is an `.npy` entry at `<group>/<name>`:
//!
//! ```text
//! static/object_ids
//! static/{mass,static_friction,dynamic_friction,bounciness}      rigidbodies
//! static/container/<param>, static/<kind>_actors/<field>          flex
//! frames/0000/images/<pass mask>
//! frames/0000/objects/{positions,forwards,rotations}
//! frames/0000/objects/{velocities,angular_velocities}             rigidbodies
//! frames/0000/collisions/{object_ids,relative_velocities,contacts}
//! frames/0000/env_collisions/{object_ids,contacts}
//! frames/0000/camera_matrices/{projection_matrix,camera_matrix}
//! frames/0000/{particles,velocities}/<object id>                  flex
//! ```
//!
//! The file is built at a staging path and only moved to its final name by
//! [`DatasetWriter::finalize`].

use std::collections::HashSet;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use trialgen_core::{ContactPoint, DatasetFlavor, Frame, ObjectObservation, TrialStatic, Vec3};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::WriterError;
use crate::npy::NpyArray;

/// Width of the zero-padded frame group names
pub const FRAME_INDEX_WIDTH: usize = 4;

/// Writes one trial to a staging file
pub struct DatasetWriter {
    zip: ZipWriter<File>,
    temp_path: PathBuf,
    flavor: DatasetFlavor,
    options: SimpleFileOptions,
    /// Directory entries already added
    groups: HashSet<String>,
    static_written: bool,
    next_frame: u32,
}

impl DatasetWriter {
    /// Create (or truncate) the staging file
    pub fn open<P: AsRef<Path>>(temp_path: P, flavor: DatasetFlavor) -> Result<Self, WriterError> {
        let temp_path = temp_path.as_ref().to_path_buf();
        let file = File::create(&temp_path)?;
        log::debug!("Opened trial staging file {}", temp_path.display());
        Ok(Self {
            zip: ZipWriter::new(file),
            temp_path,
            flavor,
            options: SimpleFileOptions::default().compression_method(CompressionMethod::Deflated),
            groups: HashSet::new(),
            static_written: false,
            next_frame: 0,
        })
    }

    pub fn temp_path(&self) -> &Path {
        &self.temp_path
    }

    /// Number of frames appended so far
    pub fn frame_count(&self) -> u32 {
        self.next_frame
    }

    pub fn static_written(&self) -> bool {
        self.static_written
    }

    /// Write the static section
    ///
    /// Allowed exactly once per trial, at any point before `finalize`. The
    /// controller writes it after the last frame, since objects added
    /// mid-trial must appear in the static arrays.
    pub fn write_static(&mut self, record: &TrialStatic) -> Result<(), WriterError> {
        if self.static_written {
            return Err(WriterError::StaticAlreadyWritten);
        }
        let ids: Vec<i32> = record.object_ids.iter().map(|id| id.get()).collect();
        self.group("static")?;
        self.array("static/object_ids", &NpyArray::from_i32(&[ids.len()], &ids))?;

        if let Some(rigid) = &record.rigid {
            for (name, values) in [
                ("mass", &rigid.mass),
                ("static_friction", &rigid.static_friction),
                ("dynamic_friction", &rigid.dynamic_friction),
                ("bounciness", &rigid.bounciness),
            ] {
                let path = format!("static/{name}");
                self.array(&path, &NpyArray::from_f32(&[values.len()], values))?;
            }
        }

        if let Some(flex) = &record.flex {
            self.group("static/container")?;
            if let Some(container) = &flex.container {
                for (name, value) in container.fields() {
                    let path = format!("static/container/{name}");
                    self.array(&path, &NpyArray::from_f32(&[1], &[value]))?;
                }
            }
            for (group_name, actors) in flex.grouped() {
                let group = format!("static/{group_name}");
                self.group(&group)?;
                if actors.is_empty() {
                    continue;
                }
                let ids: Vec<i32> = actors.iter().map(|(id, _)| id.get()).collect();
                self.array(&format!("{group}/object_id"), &NpyArray::from_i32(&[ids.len()], &ids))?;
                let field_names: Vec<&str> =
                    actors[0].1.fields().into_iter().map(|(name, _)| name).collect();
                for (i, field) in field_names.iter().enumerate() {
                    let values: Vec<f32> = actors.iter().map(|(_, a)| a.fields()[i].1).collect();
                    let path = format!("{group}/{field}");
                    self.array(&path, &NpyArray::from_f32(&[values.len()], &values))?;
                }
            }
        }

        self.static_written = true;
        Ok(())
    }

    /// Append the next frame
    ///
    /// Frame indices must be contiguous and start at 0.
    pub fn append_frame(&mut self, frame: &Frame) -> Result<(), WriterError> {
        if frame.index != self.next_frame {
            return Err(WriterError::FrameOutOfOrder {
                expected: self.next_frame,
                got: frame.index,
            });
        }
        let root = format!("frames/{:0width$}", frame.index, width = FRAME_INDEX_WIDTH);
        self.group("frames")?;
        self.group(&root)?;

        self.group(&format!("{root}/images"))?;
        for pass in &frame.images {
            self.array(
                &format!("{root}/images/{}", pass.pass_mask),
                &NpyArray::from_u8(&[pass.data.len()], &pass.data),
            )?;
        }

        self.write_objects(&root, &frame.objects)?;
        self.write_collisions(&root, frame)?;

        let camera = format!("{root}/camera_matrices");
        self.group(&camera)?;
        if let Some(matrices) = &frame.camera {
            self.array(
                &format!("{camera}/projection_matrix"),
                &NpyArray::from_f32(&[16], matrices.projection.as_slice()),
            )?;
            self.array(
                &format!("{camera}/camera_matrix"),
                &NpyArray::from_f32(&[16], matrices.camera.as_slice()),
            )?;
        }

        if self.flavor == DatasetFlavor::Flex {
            self.group(&format!("{root}/particles"))?;
            self.group(&format!("{root}/velocities"))?;
            for obs in &frame.particles {
                let particles: Vec<f32> = obs.particles.iter().flatten().copied().collect();
                self.array(
                    &format!("{root}/particles/{}", obs.id),
                    &NpyArray::from_f32(&[obs.particles.len(), 4], &particles),
                )?;
                self.array(
                    &format!("{root}/velocities/{}", obs.id),
                    &vec3_array(&obs.velocities),
                )?;
            }
        }

        self.next_frame += 1;
        Ok(())
    }

    fn write_objects(
        &mut self,
        root: &str,
        objects: &[ObjectObservation],
    ) -> Result<(), WriterError> {
        let group = format!("{root}/objects");
        self.group(&group)?;
        let n = objects.len();
        let positions: Vec<Vec3> = objects.iter().map(|o| o.position).collect();
        let forwards: Vec<Vec3> = objects.iter().map(|o| o.forward).collect();
        let rotations: Vec<f32> = objects.iter().flat_map(|o| o.rotation.to_array()).collect();
        self.array(&format!("{group}/positions"), &vec3_array(&positions))?;
        self.array(&format!("{group}/forwards"), &vec3_array(&forwards))?;
        self.array(&format!("{group}/rotations"), &NpyArray::from_f32(&[n, 4], &rotations))?;

        if self.flavor == DatasetFlavor::Rigidbodies {
            let nan = Vec3::splat(f32::NAN);
            let velocities: Vec<Vec3> = objects.iter().map(|o| o.velocity.unwrap_or(nan)).collect();
            let angular: Vec<Vec3> = objects
                .iter()
                .map(|o| o.angular_velocity.unwrap_or(nan))
                .collect();
            self.array(&format!("{group}/velocities"), &vec3_array(&velocities))?;
            self.array(&format!("{group}/angular_velocities"), &vec3_array(&angular))?;
        }
        Ok(())
    }

    fn write_collisions(&mut self, root: &str, frame: &Frame) -> Result<(), WriterError> {
        let group = format!("{root}/collisions");
        self.group(&group)?;
        let pairs: Vec<i32> = frame
            .collisions
            .iter()
            .flat_map(|c| [c.collider.get(), c.collidee.get()])
            .collect();
        let relative: Vec<Vec3> = frame.collisions.iter().map(|c| c.relative_velocity).collect();
        let contacts = contact_array(frame.collisions.iter().flat_map(|c| c.contacts.iter()));
        self.array(
            &format!("{group}/object_ids"),
            &NpyArray::from_i32(&[frame.collisions.len(), 2], &pairs),
        )?;
        self.array(&format!("{group}/relative_velocities"), &vec3_array(&relative))?;
        self.array(&format!("{group}/contacts"), &contacts)?;

        let group = format!("{root}/env_collisions");
        self.group(&group)?;
        let ids: Vec<i32> = frame.env_collisions.iter().map(|c| c.object.get()).collect();
        let contacts = contact_array(frame.env_collisions.iter().flat_map(|c| c.contacts.iter()));
        self.array(&format!("{group}/object_ids"), &NpyArray::from_i32(&[ids.len()], &ids))?;
        self.array(&format!("{group}/contacts"), &contacts)?;
        Ok(())
    }

    /// Close the archive and move it to `final_path`
    pub fn finalize<P: AsRef<Path>>(self, final_path: P) -> Result<PathBuf, WriterError> {
        if !self.static_written {
            return Err(WriterError::MissingStatic);
        }
        let final_path = final_path.as_ref().to_path_buf();
        let file = self.zip.finish()?;
        file.sync_all()?;
        drop(file);
        fs::rename(&self.temp_path, &final_path)?;
        log::debug!(
            "Moved {} to {} ({} frames)",
            self.temp_path.display(),
            final_path.display(),
            self.next_frame
        );
        Ok(final_path)
    }

    /// Drop the partial file without publishing it
    pub fn abandon(self) -> Result<(), WriterError> {
        let temp_path = self.temp_path.clone();
        drop(self.zip);
        match fs::remove_file(&temp_path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn group(&mut self, path: &str) -> Result<(), WriterError> {
        if self.groups.insert(path.to_string()) {
            self.zip.add_directory(format!("{path}/"), self.options)?;
        }
        Ok(())
    }

    fn array(&mut self, path: &str, array: &NpyArray) -> Result<(), WriterError> {
        self.zip.start_file(path, self.options)?;
        self.zip.write_all(&array.to_bytes())?;
        Ok(())
    }
}

fn vec3_array(values: &[Vec3]) -> NpyArray {
    NpyArray::from_f32(&[values.len(), 3], bytemuck::cast_slice(values))
}

fn contact_array<'a>(contacts: impl Iterator<Item = &'a ContactPoint>) -> NpyArray {
    let mut values = Vec::new();
    let mut count = 0;
    for contact in contacts {
        values.extend_from_slice(&contact.normal.to_array());
        values.extend_from_slice(&contact.point.to_array());
        count += 1;
    }
    NpyArray::from_f32(&[count, 2, 3], &values)
}
