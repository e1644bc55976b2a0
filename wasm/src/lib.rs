use minesweeper_ai::{self as ms, MineField};
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
pub fn create_game(height: u8, width: u8, mines: u8) -> Result<Vec<u8>, String> {
    console_error_panic_hook::set_once();

    let config = ms::GameConfig {
        height: height as usize,
        width: width as usize,
        mines: mines as usize,
    };
    let board = ms::Board::generate(&config, &mut rand::rng()).map_err(|e| e.to_string())?;
    ms::Session::new(board).to_bytes().map_err(|e| e.to_string())
}

#[wasm_bindgen]
pub fn is_won(bts: Vec<u8>) -> Result<bool, String> {
    console_error_panic_hook::set_once();

    let session = ms::Session::from_bytes(&bts).map_err(|e| e.to_string())?;
    Ok(session.state() == ms::GameState::Won)
}

/// Lets the bot make one move. The last byte of the result is 1 if the move
/// hit a mine and 0 otherwise.
#[wasm_bindgen]
pub fn step(bts: Vec<u8>) -> Result<Vec<u8>, String> {
    console_error_panic_hook::set_once();

    let mut session = ms::Session::from_bytes(&bts).map_err(|e| e.to_string())?;
    let turn = session
        .step(&mut rand::rng())
        .map_err(|e| e.to_string())?
        .ok_or("no moves are left to make")?;
    let mut xs = session.to_bytes().map_err(|e| e.to_string())?;
    xs.push(if turn.outcome == ms::Outcome::Exploded { 1 } else { 0 });
    Ok(xs)
}

/// Row-major cell codes: -1 hidden, -2 proven safe, -3 flagged mine,
/// -4 exploded, otherwise the revealed clue.
#[wasm_bindgen]
pub fn get_cells(bts: Vec<u8>) -> Result<Vec<i8>, String> {
    console_error_panic_hook::set_once();

    let session = ms::Session::from_bytes(&bts).map_err(|e| e.to_string())?;
    Ok(session
        .board()
        .dimensions()
        .cells()
        .map(|cell| match session.view(cell) {
            ms::CellView::Hidden => -1,
            ms::CellView::Safe => -2,
            ms::CellView::Flagged => -3,
            ms::CellView::Exploded => -4,
            ms::CellView::Revealed(n) => n as i8,
        })
        .collect())
}
