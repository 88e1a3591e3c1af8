// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Image codec and annotation utilities for the damage-assessment pipeline.

pub mod annotate;
pub mod image_utils;

pub use annotate::Annotator;
pub use image_utils::{decode_image_bytes, encode_jpeg, to_base64, CodecError, ImageInfo};
