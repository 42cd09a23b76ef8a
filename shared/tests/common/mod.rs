#![allow(dead_code)]

use backdrop_shared::{App, Effect, Event, Model, PhotoId, SelectedFile};
use crux_core::testing::{AppTester, Update};
use crux_core::Request;
use crux_http::protocol::{HttpRequest, HttpResponse, HttpResult};
use image::{ExtendedColorType, ImageEncoder};

pub const ADD_PHOTO_URL: &str = "http://localhost:8000/api/v1/add-photo/";
pub const REMOVE_PHOTO_URL: &str = "http://localhost:8000/api/v1/remove-photo/";
pub const GENERATE_URL: &str = "http://localhost:8000/api/v1/generate-background/";

pub type Tester = AppTester<App, Effect>;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn setup() -> (Tester, Model) {
    init_tracing();
    (Tester::default(), Model::default())
}

pub fn create_test_png(width: u32, height: u32) -> Vec<u8> {
    use image::{ImageBuffer, Rgba};
    let img: ImageBuffer<Rgba<u8>, Vec<u8>> =
        ImageBuffer::from_fn(width, height, |x, y| Rgba([x as u8, y as u8, 128, 255]));
    let mut buffer = Vec::new();
    image::codecs::png::PngEncoder::new(&mut buffer)
        .write_image(img.as_raw(), width, height, ExtendedColorType::Rgba8)
        .unwrap();
    buffer
}

pub fn png_file(name: &str) -> SelectedFile {
    SelectedFile {
        name: name.into(),
        mime_type: "image/png".into(),
        bytes: create_test_png(8, 6),
    }
}

pub fn text_file(name: &str) -> SelectedFile {
    SelectedFile {
        name: name.into(),
        mime_type: "text/plain".into(),
        bytes: b"hello".to_vec(),
    }
}

pub fn http_requests(update: Update<Effect, Event>) -> Vec<Request<HttpRequest>> {
    update.into_effects().filter_map(Effect::into_http).collect()
}

pub fn render_count(update: &Update<Effect, Event>) -> usize {
    update.effects.iter().filter(|e| e.is_render()).count()
}

pub fn header<'a>(request: &'a HttpRequest, name: &str) -> Option<&'a str> {
    request
        .headers
        .iter()
        .find(|h| h.name.eq_ignore_ascii_case(name))
        .map(|h| h.value.as_str())
}

pub fn json_body(request: &HttpRequest) -> serde_json::Value {
    serde_json::from_slice(&request.body).expect("request body is JSON")
}

pub fn ok_json(value: serde_json::Value) -> HttpResult {
    HttpResult::Ok(HttpResponse::ok().json(value).build())
}

pub fn status_json(status: u16, value: serde_json::Value) -> HttpResult {
    HttpResult::Ok(HttpResponse::status(status).json(value).build())
}

pub fn transport_error(reason: &str) -> HttpResult {
    HttpResult::Err(crux_http::HttpError::Io(reason.to_string()))
}

/// Sends `event` and returns the HTTP requests it produced.
pub fn send(app: &Tester, model: &mut Model, event: Event) -> Vec<Request<HttpRequest>> {
    http_requests(app.update(event, model))
}

/// Resolves a request as the shell would and feeds the resulting events back
/// into the app. Returns any follow-up HTTP requests.
pub fn resolve(
    app: &Tester,
    model: &mut Model,
    request: &mut Request<HttpRequest>,
    result: HttpResult,
) -> Vec<Request<HttpRequest>> {
    let update = app.resolve(request, result).expect("resolves");
    let mut follow_up = Vec::new();
    for event in update.events {
        follow_up.extend(send(app, model, event));
    }
    follow_up
}

/// Selects a PNG and returns the single upload request.
pub fn select(app: &Tester, model: &mut Model, name: &str) -> Request<HttpRequest> {
    let mut requests = send(app, model, Event::PhotoSelected(png_file(name)));
    let upload = requests.pop().expect("an upload request");
    assert_eq!(upload.operation.url, ADD_PHOTO_URL);
    upload
}

/// Selects a PNG and completes its upload with `photo_id`.
pub fn upload_ready(app: &Tester, model: &mut Model, photo_id: &str) {
    let mut upload = select(app, model, "cat.png");
    let follow_up = resolve(
        app,
        model,
        &mut upload,
        ok_json(serde_json::json!({ "photo_id": photo_id })),
    );
    assert!(follow_up.is_empty());
    assert_eq!(model.session.photo_id(), Some(&PhotoId::from(photo_id)));
}
