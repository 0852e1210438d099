/*!
 * # Editing Core
 *
 * The document owns the text and the annotation list; every other view in
 * the crate (collections, joins) holds annotation identities into it.
 *
 * ## Architecture Overview
 *
 * ### 1. Single Source of Truth: xi-rope Buffer
 * - Content is stored in one **`xi_rope::Rope`** buffer
 * - Public positions are **Unicode scalar offsets**; byte offsets never leak
 *   out of this module
 *
 * ### 2. Command-Based Editing
 * - Text edits are **Commands** (`Cmd`) that compile to a **Delta** over the
 *   buffer
 * - Applying a command returns a **Patch** with the changed ranges and the
 *   new document version
 *
 * ### 3. Boundary Remapping
 * - After the buffer changes, every annotation boundary is mapped through
 *   the edit (`remap`), start and end independently:
 *   - insertion: boundaries at or after the insertion point move by the
 *     inserted length
 *   - deletion: boundaries inside the deleted span collapse to its start,
 *     boundaries after it move back by the deleted length
 * - Edits are total: positions are clamped, never rejected
 *
 * ## Module Structure
 *
 * - **`document`**: `Document`, `DocumentData` and the identity-based
 *   annotation lifecycle
 * - **`commands`**: `Cmd` and delta compilation
 * - **`remap`**: boundary mapping rules
 * - **`options`**: `DocumentOptions` loaded from configuration
 * - **`patch`**: edit result metadata
 */

pub mod commands;
pub mod document;
pub mod options;
pub mod patch;
pub(crate) mod remap;

pub use commands::Cmd;
pub use document::{Document, DocumentData};
pub use options::{BoundsPolicy, DocumentOptions};
pub use patch::Patch;
