// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Assembly of descriptor tables from shader reflection.
//!
//! Bindings of every stage are merged by `(space, view type, slot)`. Each register
//! space gets one table for constant buffers, shader resources and unordered access
//! views, and one for samplers. Inside a table, entries are ordered by view type then
//! slot, and consecutive slots of one view type collapse into a single range. The
//! result is a plain value: two pipelines with the same bindings produce equal
//! descriptions and share one cached native layout.

use crate::renderer::api::*;
use crate::renderer::error::ValidationError;
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

fn table_kind(view_type: ViewType) -> TableKind {
    match view_type {
        ViewType::Sampler => TableKind::Samplers,
        _ => TableKind::Resources,
    }
}

type MergeKey = (u32, TableKind, ViewType, u32);

fn merge_bindings(
    shaders: &[(ShaderStage, &ShaderReflection)],
) -> Result<BTreeMap<MergeKey, BindingLayoutEntry>, ValidationError> {
    let mut merged = BTreeMap::new();
    for (stage, reflection) in shaders {
        for binding in &reflection.bindings {
            let key = (
                binding.space,
                table_kind(binding.view_type),
                binding.view_type,
                binding.slot,
            );
            let count = binding.count.max(1);
            if binding.slot.checked_add(count).is_none() {
                return Err(ValidationError::BindingRangeOverflow {
                    space: binding.space,
                    base_slot: binding.slot,
                    count,
                });
            }
            match merged.entry(key) {
                Entry::Vacant(vacant) => {
                    vacant.insert(BindingLayoutEntry {
                        view_type: binding.view_type,
                        slot: binding.slot,
                        count,
                        dimension: binding.dimension,
                        return_type: binding.return_type,
                        structure_stride: binding.structure_stride,
                        visibility: stage.flag(),
                    });
                }
                Entry::Occupied(mut occupied) => {
                    let entry = occupied.get_mut();
                    if entry.count != count
                        || entry.dimension != binding.dimension
                        || entry.return_type != binding.return_type
                        || entry.structure_stride != binding.structure_stride
                    {
                        return Err(ValidationError::ConflictingBinding {
                            space: binding.space,
                            slot: binding.slot,
                        });
                    }
                    entry.visibility.insert(stage.flag());
                }
            }
        }
    }
    Ok(merged)
}

/// Builds the binding layout of a pipeline from the reflection of its shaders.
/// ## Errors
/// * `ValidationError::ConflictingBinding` - If two stages declare one slot with
///   different shapes, or two array bindings overlap.
/// * `ValidationError::BindingRangeOverflow` - If a binding or a table runs past
///   the largest slot index.
pub fn build_binding_layout(
    shaders: &[(ShaderStage, &ShaderReflection)],
) -> Result<BindingLayoutDescription, ValidationError> {
    let mut tables: Vec<DescriptorTable> = Vec::new();

    for ((space, kind, _, _), entry) in merge_bindings(shaders)? {
        let same_table = matches!(tables.last(), Some(table) if table.space == space && table.kind == kind);
        if !same_table {
            tables.push(DescriptorTable {
                space,
                kind,
                visibility: ShaderStageFlags::empty(),
                entries: Vec::new(),
                ranges: Vec::new(),
            });
        }
        let Some(table) = tables.last_mut() else {
            continue;
        };

        let offset = table.descriptor_count();
        if offset.checked_add(entry.count).is_none() {
            return Err(ValidationError::BindingRangeOverflow {
                space,
                base_slot: entry.slot,
                count: entry.count,
            });
        }
        match table.ranges.last_mut() {
            Some(range) if range.view_type == entry.view_type => {
                let end = range.base_slot + range.count;
                if entry.slot < end {
                    return Err(ValidationError::ConflictingBinding {
                        space,
                        slot: entry.slot,
                    });
                }
                if entry.slot == end {
                    range.count += entry.count;
                } else {
                    table.ranges.push(DescriptorRange {
                        view_type: entry.view_type,
                        base_slot: entry.slot,
                        count: entry.count,
                        offset_in_table: offset,
                    });
                }
            }
            _ => table.ranges.push(DescriptorRange {
                view_type: entry.view_type,
                base_slot: entry.slot,
                count: entry.count,
                offset_in_table: offset,
            }),
        }
        table.visibility.insert(entry.visibility);
        table.entries.push(entry);
    }

    Ok(BindingLayoutDescription { tables })
}
