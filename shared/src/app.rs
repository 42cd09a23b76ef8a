use tracing::{debug, info, warn};

use crate::capabilities::{
    generation_outcome, upload_outcome, AddPhotoResponse, Capabilities, Endpoint,
    GenerateBackgroundRequest, GenerateBackgroundResponse, MultipartForm, Part,
    RemovePhotoRequest,
};
use crate::event::{Event, SelectedFile};
use crate::image_processing;
use crate::model::{Model, PhotoId, Session, Upload, UploadTicket};
use crate::view::ViewModel;
use crate::{AppError, ErrorKind, MSG_GENERATION_ERROR, UPLOAD_FIELD_NAME};

#[derive(Default)]
pub struct App;

impl App {
    fn send_upload(file: SelectedFile, ticket: UploadTicket, model: &Model, caps: &Capabilities) {
        let SelectedFile {
            name,
            mime_type,
            bytes,
        } = file;

        let form = MultipartForm::new().part(
            UPLOAD_FIELD_NAME,
            Part::bytes(bytes).file_name(name).mime(mime_type),
        );
        let content_type = form.content_type();

        // Header after body: the body would otherwise set application/octet-stream.
        caps.http
            .post(model.config.endpoint(Endpoint::AddPhoto))
            .body_bytes(form.finish())
            .header("Content-Type", content_type)
            .expect_json::<AddPhotoResponse>()
            .send(move |result| Event::PhotoUploaded {
                ticket,
                result: Box::new(result),
            });
    }

    /// Best-effort: the outcome is only ever logged.
    fn release_photo(photo_id: PhotoId, model: &Model, caps: &Capabilities) {
        let body = RemovePhotoRequest {
            photo_id: photo_id.clone(),
        };

        match caps
            .http
            .delete(model.config.endpoint(Endpoint::RemovePhoto))
            .body_json(&body)
        {
            Ok(builder) => {
                debug!(photo_id = %photo_id, "releasing photo");
                builder.send(move |result| Event::PhotoReleased {
                    photo_id,
                    result: Box::new(result),
                });
            }
            Err(e) => {
                warn!(photo_id = %photo_id, error = %e, "could not encode release request");
            }
        }
    }

    fn handle_photo_selected(file: SelectedFile, model: &mut Model, caps: &Capabilities) {
        let original = match image_processing::accept(&file, model.config.max_upload_bytes()) {
            Ok(original) => original,
            Err(e) => {
                info!(reason = %e, "photo rejected");
                model.set_error(e.into());
                caps.render.render();
                return;
            }
        };

        if let Some(previous) = model.session.photo_id().cloned() {
            Self::release_photo(previous, model, caps);
        }

        let ticket = model.issue_upload_ticket();
        info!(
            ticket = ticket.value(),
            size_bytes = original.size_bytes,
            mime_type = %original.mime_type,
            "uploading photo"
        );

        model.session = Session::loaded(original, ticket);
        model.clear_error();
        Self::send_upload(file, ticket, model, caps);
        caps.render.render();
    }

    fn handle_generate(model: &mut Model, caps: &Capabilities) {
        if model.session.is_generating() {
            debug!("generation already in flight, ignoring request");
            return;
        }

        let Some(photo_id) = model.session.photo_id().cloned() else {
            model.set_error(AppError::upload_first());
            caps.render.render();
            return;
        };

        let request = GenerateBackgroundRequest::new(photo_id, &model.context);
        let builder = match caps
            .http
            .post(model.config.endpoint(Endpoint::GenerateBackground))
            .body_json(&request)
        {
            Ok(builder) => builder,
            Err(e) => {
                model.set_error(
                    AppError::new(ErrorKind::Generation, MSG_GENERATION_ERROR)
                        .with_internal(e.to_string()),
                );
                caps.render.render();
                return;
            }
        };

        let ticket = model.issue_generation_ticket();
        if model.session.begin_generation(ticket).is_none() {
            return;
        }
        model.clear_error();

        info!(
            ticket = ticket.value(),
            photo_id = %request.photo_id,
            has_context = request.context.is_some(),
            "requesting background"
        );

        builder
            .expect_json::<GenerateBackgroundResponse>()
            .send(move |result| Event::BackgroundGenerated {
                ticket,
                result: Box::new(result),
            });
        caps.render.render();
    }

    fn handle_remove(model: &mut Model, caps: &Capabilities) {
        if model.session.is_empty() {
            debug!("nothing to remove");
            return;
        }

        // Local state goes regardless of what the backend says.
        if let Some(photo_id) = model.session.photo_id().cloned() {
            Self::release_photo(photo_id, model, caps);
        }

        model.reset();
        caps.render.render();
    }
}

impl crux_core::App for App {
    type Event = Event;
    type Model = Model;
    type ViewModel = ViewModel;
    type Capabilities = Capabilities;

    fn update(&self, event: Event, model: &mut Model, caps: &Capabilities) {
        let event_name = event.name();
        debug!(event = event_name, "update");

        if event.is_user_initiated() {
            info!(event = event_name, "user_action");
        }

        match event {
            Event::Configure {
                base_url,
                max_upload_bytes,
            } => {
                match model.config.reconfigured(&base_url, max_upload_bytes) {
                    Ok(config) => {
                        info!(
                            base_url = %config.base_url(),
                            max_upload_bytes = config.max_upload_bytes(),
                            "backend configured"
                        );
                        model.config = config;
                        if model
                            .error
                            .as_ref()
                            .is_some_and(|e| e.kind == ErrorKind::Configuration)
                        {
                            model.clear_error();
                        }
                    }
                    Err(e) => {
                        warn!(error = %e, "rejected backend configuration");
                        model.set_error(e.into());
                    }
                }
                caps.render.render();
            }

            Event::PhotoSelected(file) => Self::handle_photo_selected(file, model, caps),

            Event::ContextChanged(context) => {
                model.context = context;
                caps.render.render();
            }

            Event::GenerateRequested => Self::handle_generate(model, caps),

            Event::RemoveRequested => Self::handle_remove(model, caps),

            Event::DismissError => {
                model.clear_error();
                caps.render.render();
            }

            Event::PhotoUploaded { ticket, result } => {
                if model.session.pending_upload() != Some(ticket) {
                    debug!(ticket = ticket.value(), "discarding stale upload response");
                    // Nobody will ever reference this upload again.
                    if let Ok(orphan) = upload_outcome(*result) {
                        Self::release_photo(orphan, model, caps);
                    }
                    return;
                }

                match upload_outcome(*result) {
                    Ok(photo_id) => {
                        info!(ticket = ticket.value(), photo_id = %photo_id, "photo uploaded");
                        model.session.settle_upload(ticket, Upload::Complete(photo_id));
                        model.clear_error();
                    }
                    Err(e) => {
                        warn!(
                            ticket = ticket.value(),
                            code = e.code(),
                            status = ?e.http_status,
                            internal = ?e.internal_message,
                            "photo upload failed"
                        );
                        model.session.settle_upload(ticket, Upload::Failed);
                        model.set_error(e);
                    }
                }
                caps.render.render();
            }

            Event::BackgroundGenerated { ticket, result } => {
                if model.session.generation_ticket() != Some(ticket) {
                    debug!(ticket = ticket.value(), "discarding stale generation response");
                    return;
                }

                match generation_outcome(*result) {
                    Ok(background) => {
                        info!(
                            ticket = ticket.value(),
                            source = ?background.source,
                            "background generated"
                        );
                        model.session.finish_generation(ticket, Some(background));
                        model.clear_error();
                    }
                    Err(e) => {
                        warn!(
                            ticket = ticket.value(),
                            code = e.code(),
                            status = ?e.http_status,
                            internal = ?e.internal_message,
                            "background generation failed"
                        );
                        model.session.finish_generation(ticket, None);
                        model.set_error(e);
                    }
                }
                caps.render.render();
            }

            Event::PhotoReleased { photo_id, result } => match *result {
                Ok(response) => {
                    debug!(
                        photo_id = %photo_id,
                        status = u16::from(response.status()),
                        "photo released"
                    );
                }
                Err(e) => {
                    warn!(photo_id = %photo_id, error = %e, "photo release failed");
                }
            },
        }
    }

    fn view(&self, model: &Model) -> ViewModel {
        ViewModel::from(model)
    }
}
