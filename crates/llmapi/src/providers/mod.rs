pub mod gemini;

pub use gemini::{
    convert_body_parts_gemini, generate_fn, response_to_text_data, send_generate_request,
};
