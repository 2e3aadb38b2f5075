//! Android-specific platform functionality
//!
//! Permissions, camera intents, the media scanner and "open with" requests,
//! all through JNI against the app's Android context.

use jni::JNIEnv;
use jni::objects::{JObject, JValue};
use myalbum_engine::{MediaKind, Permission, PermissionRequest, ViewError};
use std::path::Path;

const READ_EXTERNAL_STORAGE: &str = "android.permission.READ_EXTERNAL_STORAGE";
const WRITE_EXTERNAL_STORAGE: &str = "android.permission.WRITE_EXTERNAL_STORAGE";
const CAMERA: &str = "android.permission.CAMERA";
const PERMISSION_GRANTED: i32 = 0; // PackageManager.PERMISSION_GRANTED

const FLAG_GRANT_READ_URI_PERMISSION: i32 = 0x00000001;
const FLAG_GRANT_WRITE_URI_PERMISSION: i32 = 0x00000002;
const FLAG_ACTIVITY_NEW_TASK: i32 = 0x10000000;

/// Build.VERSION_CODES.R, the first release with "All files access"
const SDK_MANAGE_ALL_FILES: i32 = 30;

/// Get the Android SDK version (Build.VERSION.SDK_INT)
fn get_sdk_version(env: &mut JNIEnv) -> Result<i32, jni::errors::Error> {
    let build_version = env.find_class("android/os/Build$VERSION")?;
    let sdk_int = env.get_static_field(build_version, "SDK_INT", "I")?;
    sdk_int.i()
}

/// ContextCompat.checkSelfPermission(context, permission)
fn check_permission(
    env: &mut JNIEnv,
    context: &JObject,
    permission: &str,
) -> Result<bool, jni::errors::Error> {
    let context_compat = env.find_class("androidx/core/content/ContextCompat")?;
    let permission = env.new_string(permission)?;

    let result = env.call_static_method(
        context_compat,
        "checkSelfPermission",
        "(Landroid/content/Context;Ljava/lang/String;)I",
        &[JValue::Object(context), JValue::Object(&permission.into())],
    )?;

    Ok(result.i()? == PERMISSION_GRANTED)
}

/// Environment.isExternalStorageManager() (Android 11+)
fn check_manage_storage_permission(env: &mut JNIEnv) -> Result<bool, jni::errors::Error> {
    let environment = env.find_class("android/os/Environment")?;
    let result = env.call_static_method(environment, "isExternalStorageManager", "()Z", &[])?;
    result.z()
}

fn package_name(env: &mut JNIEnv, context: &JObject) -> Result<String, jni::errors::Error> {
    let package_name_jvalue =
        env.call_method(context, "getPackageName", "()Ljava/lang/String;", &[])?;
    let package_name_jstring: jni::objects::JString = package_name_jvalue.l()?.into();
    let package_name_str = env.get_string(&package_name_jstring)?;
    Ok(package_name_str.to_str().unwrap_or("").to_string())
}

/// new Intent(action) where `action` is a static String field of `class`
fn new_intent<'local>(
    env: &mut JNIEnv<'local>,
    class: &str,
    action_field: &str,
) -> Result<JObject<'local>, jni::errors::Error> {
    let holder = env.find_class(class)?;
    let action = env
        .get_static_field(holder, action_field, "Ljava/lang/String;")?
        .l()?;

    let intent_class = env.find_class("android/content/Intent")?;
    env.new_object(
        intent_class,
        "(Ljava/lang/String;)V",
        &[JValue::Object(&action)],
    )
}

fn add_flags(env: &mut JNIEnv, intent: &JObject, flags: i32) -> Result<(), jni::errors::Error> {
    env.call_method(
        intent,
        "addFlags",
        "(I)Landroid/content/Intent;",
        &[JValue::Int(flags)],
    )?;
    Ok(())
}

fn start_activity(
    env: &mut JNIEnv,
    context: &JObject,
    intent: &JObject,
) -> Result<(), jni::errors::Error> {
    env.call_method(
        context,
        "startActivity",
        "(Landroid/content/Intent;)V",
        &[JValue::Object(intent)],
    )?;
    Ok(())
}

/// FileProvider.getUriForFile(context, "<package>.fileprovider", new File(path))
fn content_uri<'local>(
    env: &mut JNIEnv<'local>,
    context: &JObject,
    path: &Path,
) -> Result<JObject<'local>, jni::errors::Error> {
    let path_string = env.new_string(path.to_string_lossy())?;
    let file_class = env.find_class("java/io/File")?;
    let file = env.new_object(
        file_class,
        "(Ljava/lang/String;)V",
        &[JValue::Object(&path_string.into())],
    )?;

    let authority = format!("{}.fileprovider", package_name(env, context)?);
    let authority = env.new_string(authority)?;
    let provider = env.find_class("androidx/core/content/FileProvider")?;
    env.call_static_method(
        provider,
        "getUriForFile",
        "(Landroid/content/Context;Ljava/lang/String;Ljava/io/File;)Landroid/net/Uri;",
        &[
            JValue::Object(context),
            JValue::Object(&authority.into()),
            JValue::Object(&file),
        ],
    )?
    .l()
}

/// Open the system settings for "All files access" permission (Android 11+)
fn open_manage_storage_settings(
    env: &mut JNIEnv,
    context: &JObject,
) -> Result<(), jni::errors::Error> {
    let intent = new_intent(
        env,
        "android/provider/Settings",
        "ACTION_MANAGE_ALL_FILES_ACCESS_PERMISSION",
    )?;
    add_flags(env, &intent, FLAG_ACTIVITY_NEW_TASK)?;
    start_activity(env, context, &intent)
}

/// Open app settings page for legacy permission request (Android 10 and below)
fn open_app_settings(env: &mut JNIEnv, context: &JObject) -> Result<(), jni::errors::Error> {
    let intent = new_intent(
        env,
        "android/provider/Settings",
        "ACTION_APPLICATION_DETAILS_SETTINGS",
    )?;

    // Set data to our package URI: Uri.parse("package:" + packageName)
    let package_name = package_name(env, context)?;
    let uri_string = env.new_string(format!("package:{}", package_name))?;
    let uri_class = env.find_class("android/net/Uri")?;
    let uri = env.call_static_method(
        uri_class,
        "parse",
        "(Ljava/lang/String;)Landroid/net/Uri;",
        &[JValue::Object(&uri_string.into())],
    )?;
    env.call_method(
        &intent,
        "setData",
        "(Landroid/net/Uri;)Landroid/content/Intent;",
        &[JValue::Object(&uri.l()?)],
    )?;

    add_flags(env, &intent, FLAG_ACTIVITY_NEW_TASK)?;
    start_activity(env, context, &intent)
}

/// MediaScannerConnection.scanFile(context, [path], null, null)
fn request_media_scan(
    env: &mut JNIEnv,
    context: &JObject,
    path: &Path,
) -> Result<(), jni::errors::Error> {
    let path_string = env.new_string(path.to_string_lossy())?;
    let paths = env.new_object_array(1, "java/lang/String", &path_string)?;
    let scanner = env.find_class("android/media/MediaScannerConnection")?;
    env.call_static_method(
        scanner,
        "scanFile",
        "(Landroid/content/Context;[Ljava/lang/String;[Ljava/lang/String;Landroid/media/MediaScannerConnection$OnScanCompletedListener;)V",
        &[
            JValue::Object(context),
            JValue::Object(&paths),
            JValue::Object(&JObject::null()),
            JValue::Object(&JObject::null()),
        ],
    )?;
    Ok(())
}

fn start_camera(
    env: &mut JNIEnv,
    context: &JObject,
    output: Option<&Path>,
    kind: MediaKind,
) -> Result<(), jni::errors::Error> {
    let action = match kind {
        MediaKind::Image => "ACTION_IMAGE_CAPTURE",
        MediaKind::Video => "ACTION_VIDEO_CAPTURE",
    };
    let intent = new_intent(env, "android/provider/MediaStore", action)?;
    let mut flags = FLAG_ACTIVITY_NEW_TASK;

    if let Some(output) = output {
        let uri = content_uri(env, context, output)?;
        let media_store = env.find_class("android/provider/MediaStore")?;
        let extra_output = env
            .get_static_field(media_store, "EXTRA_OUTPUT", "Ljava/lang/String;")?
            .l()?;
        env.call_method(
            &intent,
            "putExtra",
            "(Ljava/lang/String;Landroid/os/Parcelable;)Landroid/content/Intent;",
            &[JValue::Object(&extra_output), JValue::Object(&uri)],
        )?;
        flags |= FLAG_GRANT_READ_URI_PERMISSION | FLAG_GRANT_WRITE_URI_PERMISSION;
    }

    add_flags(env, &intent, flags)?;
    start_activity(env, context, &intent)
}

fn start_viewer(
    env: &mut JNIEnv,
    context: &JObject,
    target: &Path,
    mime_hint: &str,
) -> Result<(), jni::errors::Error> {
    let intent = new_intent(env, "android/content/Intent", "ACTION_VIEW")?;
    let uri = content_uri(env, context, target)?;
    let mime = env.new_string(mime_hint)?;
    env.call_method(
        &intent,
        "setDataAndType",
        "(Landroid/net/Uri;Ljava/lang/String;)Landroid/content/Intent;",
        &[JValue::Object(&uri), JValue::Object(&mime.into())],
    )?;
    add_flags(env, &intent, FLAG_GRANT_READ_URI_PERMISSION)?;

    let title = env.new_string("Open folder")?;
    let intent_class = env.find_class("android/content/Intent")?;
    let chooser = env
        .call_static_method(
            intent_class,
            "createChooser",
            "(Landroid/content/Intent;Ljava/lang/CharSequence;)Landroid/content/Intent;",
            &[JValue::Object(&intent), JValue::Object(&title.into())],
        )?
        .l()?;
    add_flags(env, &chooser, FLAG_ACTIVITY_NEW_TASK)?;
    start_activity(env, context, &chooser)
}

/// Helper to run JNI operations with proper error handling
fn with_jni<F, T>(f: F) -> Option<T>
where
    F: FnOnce(&mut JNIEnv, JObject) -> Result<T, jni::errors::Error>,
{
    let ctx = ndk_context::android_context();
    let vm = unsafe { jni::JavaVM::from_raw(ctx.vm().cast()) }.ok()?;
    let mut env = vm.attach_current_thread().ok()?;
    let context = unsafe { JObject::from_raw(ctx.context().cast()) };

    match f(&mut env, context) {
        Ok(result) => Some(result),
        Err(e) => {
            log::error!("JNI error: {e}");
            // A pending Java exception (ActivityNotFoundException, say) must
            // not leak into the next JNI call
            if env.exception_check().unwrap_or(false) {
                let _ = env.exception_describe();
                let _ = env.exception_clear();
            }
            None
        }
    }
}

pub(super) fn supports_manage_all_files() -> bool {
    with_jni(|env, _| get_sdk_version(env))
        .map(|sdk| sdk >= SDK_MANAGE_ALL_FILES)
        .unwrap_or(false)
}

pub(super) fn is_permission_granted(permission: Permission) -> bool {
    with_jni(|env, context| match permission {
        Permission::ManageAllFiles => check_manage_storage_permission(env),
        Permission::ReadStorage => check_permission(env, &context, READ_EXTERNAL_STORAGE),
        Permission::WriteStorage => check_permission(env, &context, WRITE_EXTERNAL_STORAGE),
        Permission::Camera => check_permission(env, &context, CAMERA),
    })
    .unwrap_or(false)
}

/// Open the settings page where the user can grant access.
///
/// The Dioxus activity never sees the settings result, so the responder is
/// dropped, which the gate reads as "not granted yet". The permission screen
/// lets the user re-check after coming back.
pub(super) fn request_permissions(request: PermissionRequest) {
    log::info!("Opening settings for {:?}", request.permissions);
    let scoped = request.permissions.contains(&Permission::ManageAllFiles);
    let opened = with_jni(|env, context| {
        if scoped {
            open_manage_storage_settings(env, &context)
        } else {
            open_app_settings(env, &context)
        }
    })
    .is_some();
    if !opened {
        log::warn!("Could not open the permission settings page");
    }
}

pub(super) fn scan_media_file(path: &Path) {
    if with_jni(|env, context| request_media_scan(env, &context, path)).is_some() {
        log::info!("Media scan requested for {}", path.display());
    }
}

pub(super) fn view_content(target: &Path, mime_hint: &str) -> Result<(), ViewError> {
    with_jni(|env, context| start_viewer(env, &context, target, mime_hint))
        .ok_or(ViewError::NoHandler)
}

/// Start the camera app.
///
/// With `output` the camera writes there through a FileProvider URI; without
/// it the camera saves to its own folder.
pub fn launch_camera(output: Option<&Path>, kind: MediaKind) -> bool {
    with_jni(|env, context| start_camera(env, &context, output, kind)).is_some()
}
