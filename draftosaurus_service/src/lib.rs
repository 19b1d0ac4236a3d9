use std::any::Any;
use std::io::{BufRead, Write};
use std::panic::{catch_unwind, AssertUnwindSafe};

use draftosaurus::{
    BotAgent, BotMoveResponse, ErrorResponse, LegalSlotsResponse, LegalZonesResponse, Request,
    Response, Ruleset, ScoreCalculator, ScoreResponse, ValidationCoordinator, ValidationError,
    ValidationVerdict, ZoneId,
};
use rand::Rng;
use tracing::{debug, error, trace, warn};

/// Answers [`Request`]s with the rules of one ruleset.
///
/// The service itself has no game state: every request carries the state it
/// is about. The only thing that changes between requests is the random
/// generator of the bot.
pub struct RulesService<R> {
    coordinator: ValidationCoordinator,
    rng: R,
}

impl<R: Rng> RulesService<R> {
    pub fn new(ruleset: Ruleset, rng: R) -> Self {
        Self {
            coordinator: ValidationCoordinator::new(ruleset),
            rng,
        }
    }

    /// Returns `None` for [`Request::Bye`].
    pub fn handle(&mut self, request: Request) -> Option<Response> {
        let response = match request {
            Request::ValidatePlacement {
                zone,
                pieces_in_zone,
                piece,
                slot,
                player_id,
                state,
            } => Response::Verdict(match parse_zone(&zone) {
                Ok(zone) => {
                    self.coordinator
                        .validate(zone, &pieces_in_zone, &piece, slot, player_id, &state)
                }
                Err(err) => ValidationVerdict::from_error(&err),
            }),
            Request::GetLegalSlots {
                zone,
                pieces_in_zone,
                piece,
                player_id,
                state,
            } => {
                let slots = parse_zone(&zone).and_then(|zone| {
                    self.coordinator
                        .legal_slots(zone, &pieces_in_zone, &piece, player_id, &state)
                });
                Response::LegalSlots(match slots {
                    Ok(slots) => LegalSlotsResponse {
                        valid: true,
                        legal_slots: slots.into_iter().collect(),
                        reason: None,
                    },
                    Err(err) => LegalSlotsResponse {
                        valid: false,
                        legal_slots: Vec::new(),
                        reason: Some(err.to_string()),
                    },
                })
            }
            Request::GetLegalZones {
                piece,
                player_id,
                state,
            } => Response::LegalZones(
                match self.coordinator.legal_zones(player_id, &state, &piece) {
                    Ok(zones) => LegalZonesResponse {
                        zones: zones.into_iter().collect(),
                        reason: None,
                    },
                    Err(err) => LegalZonesResponse {
                        zones: Vec::new(),
                        reason: Some(err.to_string()),
                    },
                },
            ),
            Request::ComputeScore {
                board,
                player_id,
                all_player_boards,
            } => {
                let calculator = ScoreCalculator::new(&self.coordinator.ruleset().zones);
                let report = calculator.score_board(&board, player_id, &all_player_boards);
                debug!(player = player_id, total = report.total, "Computed score");
                Response::Score(ScoreResponse::from(report))
            }
            Request::RequestBotMove {
                player_id,
                state,
                available_pieces,
            } => {
                let bot = BotAgent::new(&self.coordinator);
                let mv = bot.choose_move(&mut self.rng, player_id, &state, &available_pieces);
                Response::BotMove(BotMoveResponse { mv })
            }
            Request::Bye => return None,
        };
        Some(response)
    }

    /// Handles one line of input. Never fails: a line that is not a request
    /// and a request that panics both get an [`ErrorResponse`].
    pub fn handle_line(&mut self, line: &str) -> Option<Response> {
        let request = match serde_json::from_str::<Request>(line) {
            Ok(request) => request,
            Err(err) => {
                warn!(%err, "Could not parse request");
                return Some(error_response(&ValidationError::MalformedRequest {
                    message: err.to_string(),
                }));
            }
        };
        match catch_unwind(AssertUnwindSafe(|| self.handle(request))) {
            Ok(response) => response,
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                error!(%message, "Request handler panicked");
                Some(error_response(&ValidationError::Internal { message }))
            }
        }
    }

    /// Answers line-delimited JSON requests until [`Request::Bye`] or EOF.
    pub fn run(&mut self, mut input: impl BufRead, mut output: impl Write) -> anyhow::Result<()> {
        let mut buf = String::new();
        loop {
            // read_line() appends to the buffer
            buf.clear();
            let num_bytes_read = input.read_line(&mut buf)?;
            if num_bytes_read == 0 {
                // EOF - the client has exited.
                break Ok(());
            }
            let line = buf.trim_end();
            if line.is_empty() {
                continue;
            }
            trace!(name: "Received request", request = %line);

            let Some(response) = self.handle_line(line) else {
                break Ok(());
            };
            let response_json = serde_json::to_string(&response)?;
            trace!(name: "Sending response", response = %response_json);
            writeln!(output, "{}", response_json)?;
            output.flush()?;
        }
    }
}

fn parse_zone(zone: &str) -> Result<ZoneId, ValidationError> {
    zone.parse().map_err(|_| ValidationError::UnrecognizedZone {
        zone: String::from(zone),
    })
}

fn error_response(err: &ValidationError) -> Response {
    Response::Error(ErrorResponse {
        error: err.to_string(),
        category: err.category(),
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        String::from(*message)
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        String::from("unknown panic")
    }
}
