//! Launch Services backend (macOS).
//!
//! Extension to type mapping and conformance go through the Uniform Type
//! Identifier C API; handler lookups and writes go through the Launch
//! Services role-handler calls. Discovery runs `lsregister -dump`.

use async_trait::async_trait;
use core_foundation::array::{CFArray, CFArrayRef};
use core_foundation::base::{Boolean, TCFType};
use core_foundation::error::CFErrorRef;
use core_foundation::string::{CFString, CFStringRef};
use core_foundation::url::CFURL;
use std::path::PathBuf;
use std::ptr;
use tokio::process::Command;

use super::traits::{LaunchRegistry, RegistryError};
use super::types::{ResolvedType, TypeFamily};

type LSRolesMask = u32;
type OSStatus = i32;

const LS_ROLES_ALL: LSRolesMask = 0xFFFF_FFFF;
const NO_ERR: OSStatus = 0;

#[link(name = "CoreServices", kind = "framework")]
unsafe extern "C" {
    static kUTTagClassFilenameExtension: CFStringRef;

    fn UTTypeCreatePreferredIdentifierForTag(
        tag_class: CFStringRef,
        tag: CFStringRef,
        conforming_to: CFStringRef,
    ) -> CFStringRef;
    fn UTTypeConformsTo(type_identifier: CFStringRef, conforms_to: CFStringRef) -> Boolean;

    fn LSCopyDefaultRoleHandlerForContentType(
        content_type: CFStringRef,
        role: LSRolesMask,
    ) -> CFStringRef;
    fn LSCopyAllRoleHandlersForContentType(
        content_type: CFStringRef,
        role: LSRolesMask,
    ) -> CFArrayRef;
    fn LSSetDefaultRoleHandlerForContentType(
        content_type: CFStringRef,
        role: LSRolesMask,
        handler_bundle_id: CFStringRef,
    ) -> OSStatus;
    fn LSCopyApplicationURLsForBundleIdentifier(
        bundle_id: CFStringRef,
        out_error: *mut CFErrorRef,
    ) -> CFArrayRef;
}

/// Registry backend over the macOS Launch Services database.
#[derive(Debug, Clone)]
pub struct LaunchServicesRegistry {
    lsregister_path: PathBuf,
}

impl LaunchServicesRegistry {
    pub fn new(lsregister_path: impl Into<PathBuf>) -> Self {
        Self {
            lsregister_path: lsregister_path.into(),
        }
    }
}

fn preferred_identifier(extension: &str) -> Option<CFString> {
    let tag = CFString::new(extension);
    // SAFETY: all arguments are valid CFStrings or null; the result follows
    // the create rule and is null-checked before wrapping.
    unsafe {
        let uti = UTTypeCreatePreferredIdentifierForTag(
            kUTTagClassFilenameExtension,
            tag.as_concrete_TypeRef(),
            ptr::null(),
        );
        (!uti.is_null()).then(|| CFString::wrap_under_create_rule(uti))
    }
}

fn conforms_to(type_identifier: &CFString, parent: &str) -> bool {
    let parent = CFString::new(parent);
    // SAFETY: both arguments are live CFStrings.
    unsafe {
        UTTypeConformsTo(
            type_identifier.as_concrete_TypeRef(),
            parent.as_concrete_TypeRef(),
        ) != 0
    }
}

#[async_trait]
impl LaunchRegistry for LaunchServicesRegistry {
    async fn resolve_type(&self, extension: &str) -> Option<ResolvedType> {
        let uti = preferred_identifier(extension)?;
        let families = TypeFamily::ALL
            .into_iter()
            .filter(|family| conforms_to(&uti, family.identifier()));
        Some(ResolvedType::new(uti.to_string()).with_families(families))
    }

    async fn default_role_handler(&self, type_identifier: &str) -> Option<String> {
        let content_type = CFString::new(type_identifier);
        // SAFETY: create rule, null-checked.
        unsafe {
            let handler = LSCopyDefaultRoleHandlerForContentType(
                content_type.as_concrete_TypeRef(),
                LS_ROLES_ALL,
            );
            (!handler.is_null()).then(|| CFString::wrap_under_create_rule(handler).to_string())
        }
    }

    async fn role_handlers(&self, type_identifier: &str) -> Vec<String> {
        let content_type = CFString::new(type_identifier);
        // SAFETY: create rule, null-checked; the array holds CFStrings.
        let handlers = unsafe {
            let array =
                LSCopyAllRoleHandlersForContentType(content_type.as_concrete_TypeRef(), LS_ROLES_ALL);
            if array.is_null() {
                return Vec::new();
            }
            CFArray::<CFString>::wrap_under_create_rule(array)
        };
        handlers.iter().map(|bundle_id| bundle_id.to_string()).collect()
    }

    async fn set_default_role_handler(
        &self,
        type_identifier: &str,
        bundle_id: &str,
    ) -> Result<(), RegistryError> {
        let content_type = CFString::new(type_identifier);
        let handler = CFString::new(bundle_id);
        // SAFETY: both arguments are live CFStrings.
        let status = unsafe {
            LSSetDefaultRoleHandlerForContentType(
                content_type.as_concrete_TypeRef(),
                LS_ROLES_ALL,
                handler.as_concrete_TypeRef(),
            )
        };

        if status == NO_ERR {
            Ok(())
        } else {
            Err(RegistryError::Rejected {
                bundle_id: bundle_id.to_string(),
                type_identifier: type_identifier.to_string(),
                status,
            })
        }
    }

    async fn application_path(&self, bundle_id: &str) -> Option<PathBuf> {
        let bundle = CFString::new(bundle_id);
        // SAFETY: create rule, null-checked; the array holds CFURLs. The
        // error out-parameter is optional and left null.
        let urls = unsafe {
            let array =
                LSCopyApplicationURLsForBundleIdentifier(bundle.as_concrete_TypeRef(), ptr::null_mut());
            if array.is_null() {
                return None;
            }
            CFArray::<CFURL>::wrap_under_create_rule(array)
        };
        urls.iter().find_map(|url| url.to_path())
    }

    async fn dump(&self) -> Result<String, RegistryError> {
        let output = Command::new(&self.lsregister_path)
            .arg("-dump")
            .output()
            .await?;

        if !output.status.success() {
            return Err(RegistryError::Dump(format!(
                "{} exited with {}",
                self.lsregister_path.display(),
                output.status
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}
