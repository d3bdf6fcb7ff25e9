use actix_web::{web, HttpResponse, Responder};
use serde::{Deserialize, Serialize};
use tracing::*;

use crate::{
    index_page, screening_page, DescribeOutcome, DescriptorVector, LoadedModel, Prediction,
    Screener, DISCLAIMER, INVALID_SMILES_MESSAGE,
};

#[derive(Debug, Deserialize)]
pub struct SmilesInput {
    pub smiles: String,
}

/// Body of `POST /api/screen`.
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ScreenResponse {
    Empty,
    Invalid {
        smiles: String,
        message: String,
        detail: String,
    },
    Screened {
        smiles: String,
        descriptors: DescriptorVector,
        prediction: Prediction,
        disclaimer: &'static str,
    },
}

fn html(body: String) -> HttpResponse {
    HttpResponse::Ok().content_type("text/html; charset=utf-8").body(body)
}

async fn index() -> impl Responder {
    html(index_page())
}

async fn describe(model: web::Data<LoadedModel>, form: web::Form<SmilesInput>) -> impl Responder {
    let outcome = Screener::new(model.get_ref()).describe(&form.smiles);
    html(screening_page(&outcome, None))
}

async fn predict(model: web::Data<LoadedModel>, form: web::Form<SmilesInput>) -> impl Responder {
    let screener = Screener::new(model.get_ref());
    let outcome = screener.describe(&form.smiles);
    let prediction = outcome.descriptors().map(|descriptors| screener.predict(descriptors));
    if let Some(Prediction::Scored(verdict)) = &prediction {
        info!("Scored {:?}: {verdict}", form.smiles.trim());
    }
    html(screening_page(&outcome, prediction.as_ref()))
}

async fn screen(model: web::Data<LoadedModel>, input: web::Json<SmilesInput>) -> impl Responder {
    let screener = Screener::new(model.get_ref());
    match screener.describe(&input.smiles) {
        DescribeOutcome::Empty => HttpResponse::BadRequest().json(ScreenResponse::Empty),
        DescribeOutcome::Invalid { input, error } => {
            HttpResponse::UnprocessableEntity().json(ScreenResponse::Invalid {
                smiles: input,
                message: INVALID_SMILES_MESSAGE.to_string(),
                detail: error.to_string(),
            })
        }
        DescribeOutcome::Described {
            smiles,
            descriptors,
        } => {
            let prediction = screener.predict(&descriptors);
            HttpResponse::Ok().json(ScreenResponse::Screened {
                smiles,
                descriptors,
                prediction,
                disclaimer: DISCLAIMER,
            })
        }
    }
}

/// Routes for the screening tool. The app must carry a `web::Data<LoadedModel>`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(index))
        .route("/describe", web::post().to(describe))
        .route("/predict", web::post().to(predict))
        .route("/api/screen", web::post().to(screen));
}
